use std::{process, sync::Arc};

use bamboo_admin::{
    application::{board::PostsApi, error::AppError, panel::PanelRegistry},
    config,
    infra::{
        api_client::BoardClient,
        error::InfraError,
        http::{self, AdminState},
        telemetry,
    },
};
use bamboo_api_types::{CreatePostRequest, NewNumberResponse, VerifierAnswer};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    let client = BoardClient::new(&settings.api.base_url)?;

    match command {
        config::Command::Serve(_) => run_serve(settings, client).await,
        config::Command::NextNumber(args) => run_next_number(&client, args).await,
        config::Command::Submit(args) => run_submit(&client, args).await,
    }
}

async fn run_serve(settings: config::Settings, client: BoardClient) -> Result<(), AppError> {
    let client = Arc::new(client);
    let state = AdminState {
        posts: client.clone(),
        issuer: client,
        panels: PanelRegistry::new(),
        session: Arc::new(settings.session.clone()),
        panel: settings.panel,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "bamboo_admin::serve",
        addr = %settings.server.addr,
        api = %settings.api.base_url,
        "moderation panel listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_next_number(
    client: &BoardClient,
    args: config::NextNumberArgs,
) -> Result<(), AppError> {
    let new_number = client.next_number(&args.credential.token).await?;
    print_json(&NewNumberResponse { new_number })
}

async fn run_submit(client: &BoardClient, args: config::SubmitArgs) -> Result<(), AppError> {
    if args.content.trim().is_empty() {
        return Err(AppError::validation("submit requires non-empty --content"));
    }

    let request = CreatePostRequest {
        title: args.title.filter(|title| !title.trim().is_empty()),
        content: args.content,
        tag: args.tag.filter(|tag| !tag.trim().is_empty()),
        verifier: VerifierAnswer {
            id: args.verifier_id,
            answer: args.answer,
        },
    };

    let post = client.create_post(&args.credential.token, &request).await?;
    info!(target = "bamboo_admin::submit", id = %post.id, "post submitted");
    print_json(&post)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
