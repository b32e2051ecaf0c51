use std::sync::Arc;

use anyhow::{anyhow, Result};
use common::ServerConfig;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::{get, post, routes, Build, FromForm, Rocket, State};

use crate::pipeline::{GenerationRequest, PostGenerator};
use crate::prompt::Style;
use crate::render::{render_page, FormValues};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PostGenerator>,
}

/// Fields posted by the form. Missing fields are treated as empty.
#[derive(Debug, FromForm)]
pub struct PostForm {
    topic: Option<String>,
    audience: Option<String>,
    style: Option<String>,
}

/// Empty form.
#[get("/")]
async fn index() -> RawHtml<String> {
    RawHtml(render_page(&FormValues::default(), None, None))
}

/// Run the pipeline for the submitted form and render the result.
#[post("/", data = "<form>")]
async fn submit(state: &State<AppState>, form: Form<PostForm>) -> (Status, RawHtml<String>) {
    let form = form.into_inner();
    let topic = form.topic.unwrap_or_default().trim().to_string();
    let audience = form.audience.unwrap_or_default().trim().to_string();
    let style = Style::from_code(form.style.as_deref());

    let values = FormValues {
        topic: topic.clone(),
        audience: audience.clone(),
        style: Some(style),
    };

    if topic.is_empty() {
        return (
            Status::BadRequest,
            RawHtml(render_page(&values, None, Some("Please enter a topic."))),
        );
    }

    let request = GenerationRequest::new(topic, audience, form.style);
    match state.generator.generate(&request).await {
        Ok(result) => (Status::Ok, RawHtml(render_page(&values, Some(&result), None))),
        Err(e) => {
            let cause = format!("{:#}", e);
            tracing::error!(error = %cause, topic = %request.topic, "server: post generation failed");
            (
                Status::InternalServerError,
                RawHtml(render_page(
                    &values,
                    None,
                    Some("Sorry, the post could not be generated. Please try again later."),
                )),
            )
        }
    }
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Build the Rocket instance with routes and managed state, bound per `server` config.
pub fn build_rocket(generator: Arc<PostGenerator>, server: &ServerConfig) -> Rocket<Build> {
    let state = AppState { generator };

    let fig = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    rocket::custom(fig)
        .manage(state)
        .mount("/", routes![index, submit, health])
}

/// Build and launch the Rocket server.
///
/// This function blocks until the Rocket server shuts down (it awaits `rocket.launch().await`)
/// and returns an error if Rocket fails to start.
pub async fn launch_rocket(generator: Arc<PostGenerator>, server: &ServerConfig) -> Result<()> {
    tracing::info!(bind = %server.bind, port = server.port, "Starting Rocket HTTP server");
    build_rocket(generator, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
