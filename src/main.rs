use std::process::ExitCode;

use sftp_drop::cli::{write_outcome, Cli};
use sftp_drop::sftp::path_utils::browse_url;
use sftp_drop::upload::upload;
use tracing::warn;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    sftp_drop::init_logging(cli.verbose);

    let (request, config) = match cli.prepare() {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = upload(&request, config).await;

    let remote_dir = match write_outcome(&mut std::io::stdout(), &mut std::io::stderr(), &result) {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Failed to write output: {}", e);
            None
        }
    };

    if let (Some(dir), Some(base)) = (remote_dir, cli.url.as_deref()) {
        let url = browse_url(base, dir);
        if let Err(e) = open::that(&url) {
            warn!("Failed to open {}: {}", url, e);
        }
    }

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
