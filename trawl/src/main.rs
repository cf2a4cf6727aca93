use trawl::{command_argument_builder, exit_code_for, handle_crawl, init_tracing};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = match cmd.try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_code_for(&e));
        }
    };

    init_tracing();

    let code = handle_crawl(&matches).await;
    std::process::exit(code);
}
