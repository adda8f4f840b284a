use std::io::Write;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use rs_para_core::error::Error;
use rs_para_core::model::batch_learner::RecordFormat;
use rs_para_core::model::config::ParaphraserConfig;
use rs_para_core::model::engine::{ChangeRecord, ParaphraseVariation};
use rs_para_core::model::paraphraser::Paraphraser;
use rs_para_core::model::synonym_map::LearningDelta;

/// Number of variations when the request does not say.
const DEFAULT_VARIATIONS: usize = 3;

/// Largest number of variations a request may ask for.
const MAX_VARIATIONS: usize = 5;

/// Body of the `/v1/paraphrase` endpoint
#[derive(Deserialize)]
struct ParaphraseRequest {
	text: String,
	variations: Option<usize>,
}

/// One variation as sent to the browser: the joined text, the tokens for
/// highlighting, and the change list.
#[derive(Serialize)]
struct VariationResponse<'a> {
	text: String,
	tokens: &'a [String],
	changes: &'a [ChangeRecord],
}

impl<'a> From<&'a ParaphraseVariation> for VariationResponse<'a> {
	fn from(variation: &'a ParaphraseVariation) -> Self {
		Self { text: variation.text(), tokens: variation.tokens(), changes: variation.changes() }
	}
}

#[derive(Deserialize)]
struct LearnQuery {
	format: Option<String>,
}

#[derive(Serialize)]
struct LearnResponse<'a> {
	total_pairs_seen: usize,
	new_pairs_added: usize,
	newly_added: &'a LearningDelta,
}

#[derive(Deserialize)]
struct LexiconQuery {
	enabled: Option<bool>,
	confidence: Option<f64>,
}

struct SharedData {
	paraphraser: Paraphraser,
}

/// HTTP POST endpoint `/v1/paraphrase`
///
/// Paraphrases the posted text and returns every variation as JSON.
#[post("/v1/paraphrase")]
async fn post_paraphrase(data: web::Data<Mutex<SharedData>>, body: web::Json<ParaphraseRequest>) -> impl Responder {
	if body.text.trim().is_empty() {
		return HttpResponse::BadRequest().body("Please enter some text to paraphrase");
	}

	let count = body.variations.unwrap_or(DEFAULT_VARIATIONS);
	if !(1..=MAX_VARIATIONS).contains(&count) {
		return HttpResponse::BadRequest().body(format!("variations must be between 1 and {MAX_VARIATIONS}"));
	}

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Paraphraser lock failed"),
	};

	match shared_data.paraphraser.paraphrase(&body.text, count) {
		Ok(variations) => {
			let response: Vec<VariationResponse> = variations.iter().map(VariationResponse::from).collect();
			HttpResponse::Ok().json(response)
		}
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

/// HTTP PUT endpoint `/v1/learn`
///
/// Learns synonym pairs from the uploaded file content. The format is given
/// by the `format` query parameter (`csv`, `txt` or `tsv`, default `csv`).
#[put("/v1/learn")]
async fn put_learn(data: web::Data<Mutex<SharedData>>, query: web::Query<LearnQuery>, body: web::Bytes) -> impl Responder {
	let format = query.format.as_deref().unwrap_or("csv").trim().to_lowercase();
	if RecordFormat::from_extension(&format).is_none() {
		return HttpResponse::BadRequest().body("Format must be 'csv', 'txt' or 'tsv'");
	}

	// The learner picks the record layout from the extension
	let mut upload = match tempfile::Builder::new().prefix("synonyms-").suffix(&format!(".{format}")).tempfile() {
		Ok(f) => f,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to store upload: {e}")),
	};
	if let Err(e) = upload.write_all(&body).and_then(|_| upload.flush()) {
		return HttpResponse::InternalServerError().body(format!("Failed to store upload: {e}"));
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Paraphraser lock failed"),
	};

	match shared_data.paraphraser.learn_from_file(upload.path()) {
		Ok(report) => {
			info!("Learned {} new synonyms out of {} total words", report.new_pairs_added, report.total_pairs_seen);
			HttpResponse::Ok().json(LearnResponse {
				total_pairs_seen: report.total_pairs_seen,
				new_pairs_added: report.new_pairs_added,
				newly_added: shared_data.paraphraser.newly_added(),
			})
		}
		Err(failure) => match failure.error {
			Error::LearnFile { .. } => HttpResponse::BadRequest().body(failure.to_string()),
			_ => HttpResponse::InternalServerError().body(failure.to_string()),
		},
	}
}

/// HTTP GET endpoint `/v1/knowledge`
///
/// Returns the whole synonym knowledge in the persisted file format.
#[get("/v1/knowledge")]
async fn get_knowledge(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Paraphraser lock failed"),
	};
	HttpResponse::Ok().json(shared_data.paraphraser.knowledge())
}

#[get("/v1/knowledge/new")]
async fn get_newly_added(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Paraphraser lock failed"),
	};
	HttpResponse::Ok().json(shared_data.paraphraser.newly_added())
}

#[put("/v1/lexicon")]
async fn put_lexicon(data: web::Data<Mutex<SharedData>>, query: web::Query<LexiconQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Paraphraser lock failed"),
	};

	if let Some(confidence) = query.confidence {
		if let Err(e) = shared_data.paraphraser.set_lexicon_confidence(confidence) {
			return HttpResponse::BadRequest().body(e.to_string());
		}
	}
	if let Some(enabled) = query.enabled {
		shared_data.paraphraser.set_use_lexicon(enabled);
	}

	HttpResponse::Ok().body(if shared_data.paraphraser.uses_lexicon() { "Lexicon enabled" } else { "Lexicon disabled" })
}

/// Registers every endpoint.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(post_paraphrase)
		.service(put_learn)
		.service(get_knowledge)
		.service(get_newly_added)
		.service(put_lexicon);
}

/// Main entry point for the server.
///
/// Builds the paraphraser from the `RS_PARA_*` environment, wraps it in a
/// `Mutex` and starts an Actix-web HTTP server on `RS_PARA_BIND`
/// (default `127.0.0.1:5000`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ParaphraserConfig::from_env().map_err(std::io::Error::other)?;
	let (paraphraser, warnings) = Paraphraser::new(&config);
	for warning in warnings {
		warn!("{warning}");
	}

	let bind = std::env::var("RS_PARA_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	info!("Serving paraphraser on {bind}");

	let shared_data = web::Data::new(Mutex::new(SharedData { paraphraser }));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind(bind)?
		.run()
		.await
}
