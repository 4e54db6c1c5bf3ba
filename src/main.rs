use actix_files as fs;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};
use tera::Tera;

use simple_agent::cli::{self, Cli, Command, ServeArgs};
use simple_agent::web::{routes, AppState};
use simple_agent::{Config, ConfigError, Session, Settings};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Command::Serve(_)) => "info",
        _ => "warn",
    };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    match cli.command {
        Some(Command::Serve(args)) => serve(cli.settings, args).await,
        Some(Command::Chat { message }) => chat(cli.settings, message).await,
        None => chat(cli.settings, Vec::new()).await,
    }
}

fn build_session(settings: Settings) -> Result<Session, ConfigError> {
    let config = Config::try_from(settings)?;
    info!("Agent configuration: {:?}", config);
    Session::from_config(&config)
}

async fn chat(settings: Settings, words: Vec<String>) -> anyhow::Result<()> {
    let session = build_session(settings).context(
        "failed to initialize agent; set OPENAI_BASE_URL and OPENAI_API_KEY",
    )?;

    match cli::one_shot_message(&words) {
        Some(message) => {
            let reply = session.submit(&message).await?;
            println!("{reply}");
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let interrupted = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            cli::run_repl(&session, stdin, tokio::io::stdout(), interrupted).await?;
        }
    }
    Ok(())
}

async fn serve(settings: Settings, args: ServeArgs) -> anyhow::Result<()> {
    info!("Starting Simple Agent web server");

    // A broken configuration still serves the page; chat requests get a 500
    let session = build_session(settings);
    match &session {
        Ok(_) => info!("Agent initialized"),
        Err(e) => error!(
            "Agent failed to initialize: {}. Set OPENAI_BASE_URL and OPENAI_API_KEY",
            e
        ),
    }

    // Initialize template engine
    let pattern = format!("{}/**/*", args.template_dir.display());
    let mut tera = Tera::new(&pattern).context("template parsing error")?;
    tera.autoescape_on(vec![".html"]);

    let app_state = Data::new(AppState::new(tera, session));
    let static_dir = args.static_dir.clone();

    info!("Listening on {}:{}", args.host, args.port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", static_dir.clone()))
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await?;

    Ok(())
}
