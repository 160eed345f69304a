use std::env;
use std::io;
use std::process::ExitCode;

use ticket_service::TicketService;
use ticket_service::csv::{read_purchases, write_outcomes};
use ticket_service::service::{LoggingPaymentGateway, LoggingSeatReservation};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = env::args().nth(1) else {
        error!("usage: ticket-service <purchases.csv>");
        return ExitCode::FAILURE;
    };

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let purchases = match read_purchases(&path) {
        Ok(purchases) => purchases,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let service = TicketService::new(LoggingPaymentGateway, LoggingSeatReservation);
    let (request_sender, request_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in purchases {
            match result {
                Ok(request) => {
                    if request_sender.send(request).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let outcomes = service.run(ReceiverStream::new(request_receiver)).await;

    if let Err(e) = write_outcomes(io::stdout().lock(), &outcomes) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
