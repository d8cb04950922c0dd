use actix_web::web;

pub mod default_route;
pub mod enrich_route;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(default_route::default)
        .service(enrich_route::sample)
        .service(enrich_route::enrich);
}
