use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web::Data, App, HttpServer};

use crate::{routes, services::LeadEnricher};

pub fn run(listener: TcpListener, enricher: Data<LeadEnricher>) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(routes::configure)
            .app_data(enricher.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
