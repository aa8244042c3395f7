//! dermx binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use dermx_client::cli::{self, Args, Command};
use dermx_client::config::Config;
use dermx_client::{
    logging, CredentialAuth, DermxError, FileTokenStore, ProfileOutcome, SessionManager,
    UploadState,
};
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'dermx --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _ = logging::init_with_filter(config.log_filter());

    let Some(command) = args.command.clone() else {
        cli::print_help();
        return ExitCode::from(2);
    };

    match run(command, &args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, args: &Args, config: &Config) -> dermx_client::Result<()> {
    let backend = config.to_backend_client()?;
    let token_path = config.token_file_path();
    debug!(backend = %backend.base_url(), token_file = %token_path.display(), "configured");

    let auth = CredentialAuth::new(backend.clone(), Arc::new(FileTokenStore::new(token_path)))?;

    match command {
        Command::Login { email } => {
            let password = args
                .password
                .clone()
                .or_else(|| std::env::var("DERMX_PASSWORD").ok())
                .ok_or(DermxError::MissingPassword)?;
            auth.login(&email, &password).await?;
            match auth.store().current() {
                Some(session) => println!("Logged in as {}", session.label()),
                None => println!("Logged in (profile unavailable)"),
            }
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Logged out");
        }
        Command::Profile => {
            auth.store().require_token()?;
            match auth.fetch_user_profile(None).await {
                ProfileOutcome::Loaded(session) => {
                    println!("{}", serde_json::to_string_pretty(&session)?);
                }
                ProfileOutcome::Unavailable { reason } => {
                    eprintln!("profile unavailable: {}", reason);
                }
            }
        }
        Command::Analyze { image } => {
            let mut upload = UploadState::new();
            if !upload.select_path(&image)? {
                let notice = upload.notice().unwrap_or(dermx_client::diagnosis::REJECTION_NOTICE);
                return Err(DermxError::InvalidImage(format!(
                    "{}: {}",
                    image.display(),
                    notice
                )));
            }
            let token = auth.store().bearer_token();
            let result = upload.analyze(&backend, token.as_deref()).await?;
            print!("{}", result);
        }
        Command::Photo { url } => {
            let stored = auth.upload_profile_photo(&url).await?;
            println!("Profile photo updated: {}", stored);
        }
        Command::DeleteAccount => {
            auth.delete_account().await?;
            println!("Account deleted");
        }
    }

    Ok(())
}
