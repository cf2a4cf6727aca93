pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    EXIT_FAILURE, EXIT_SUCCESS, crawl_options_from_args, exit_code_for, handle_crawl,
    init_tracing, report_format_from_args,
};
