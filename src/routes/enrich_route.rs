use actix_multipart::{Multipart, MultipartError};
use actix_web::{get, http::header, post, web, HttpResponse};
use futures::StreamExt;

use crate::{
    domain::EnrichmentStats,
    services::{read_company_names, write_records, write_sample, LeadEnricher},
};

const SAMPLE_FILENAME: &str = "sample_companies.csv";

#[get("/sample")]
pub async fn sample() -> HttpResponse {
    let mut body = vec![];
    if let Err(e) = write_sample(&mut body) {
        log::error!("Could not build sample csv: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    csv_attachment(body, SAMPLE_FILENAME)
}

#[post("/enrich")]
pub async fn enrich(enricher: web::Data<LeadEnricher>, payload: Multipart) -> HttpResponse {
    let upload = match read_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    if upload.iter().all(|b| b.is_ascii_whitespace()) {
        return HttpResponse::BadRequest().body("Uploaded file is empty");
    }

    let files = &enricher.settings().files;
    let names = match read_company_names(upload.as_slice(), &files.name_column) {
        Ok(names) => names,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    let records = enricher.enrich_batch(&names).await;
    let stats = EnrichmentStats::from_records(&records);
    log::info!(
        "Enriched {} uploaded companies, websites found for {} ({:.1}%)",
        stats.total,
        stats.websites_found,
        stats.success_rate()
    );

    let mut body = vec![];
    if let Err(e) = write_records(&mut body, &records) {
        log::error!("Could not serialize enriched rows: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    csv_attachment(body, &files.output)
}

/// Bytes of the first multipart field.
async fn read_upload(mut payload: Multipart) -> Result<Vec<u8>, MultipartError> {
    let mut upload = vec![];
    if let Some(field) = payload.next().await {
        let mut field = field?;
        while let Some(chunk) = field.next().await {
            upload.extend_from_slice(&chunk?);
        }
    }
    Ok(upload)
}

fn csv_attachment(body: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}
