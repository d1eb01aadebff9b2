use std::env;
use std::sync::Arc;

use rideboard::api::{DynNotificationAPI, DynPrompt, DynRideRequestAPI};
use rideboard::auth::{EnvIdentity, IdentityProvider};
use rideboard::config::AppConfig;
use rideboard::coordinator::{Coordinator, Outcome};
use rideboard::entities::RideRequest;
use rideboard::error::{invalid_input_error, unauthenticated_error, Error};
use rideboard::external::{ride_service::RideServiceClient, terminal::TerminalPrompt};

enum Command {
    List,
    Delete(i64),
    Reject(i64),
}

fn parse_command(args: &[String]) -> Result<Command, Error> {
    let id = |arg: Option<&String>| -> Result<i64, Error> {
        arg.and_then(|v| v.parse().ok())
            .ok_or_else(invalid_input_error)
    };

    match args.first().map(String::as_str) {
        None | Some("list") => Ok(Command::List),
        Some("delete") => Ok(Command::Delete(id(args.get(1))?)),
        Some("reject") => Ok(Command::Reject(id(args.get(1))?)),
        Some(other) => {
            tracing::error!(command = other, "usage: rideboard [list | delete <id> | reject <id>]");
            Err(invalid_input_error())
        }
    }
}

fn print_section(title: &str, empty: &str, rides: &[RideRequest]) {
    println!("{}", title);

    if rides.is_empty() {
        println!("  {}", empty);
        return;
    }

    for ride in rides {
        println!("  {}", ride.summary());
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = AppConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let user = EnvIdentity::new(&config)
        .current_user()
        .ok_or_else(unauthenticated_error)?;

    let client = Arc::new(RideServiceClient::from_config(&config));
    let coordinator = Coordinator::from_config(
        client.clone() as DynRideRequestAPI,
        client as DynNotificationAPI,
        Arc::new(TerminalPrompt) as DynPrompt,
        None,
        &config,
    );

    tracing::info!(user_id = user.id, "loading rides");
    coordinator.attach_user(user).await?;

    let outcome = match command {
        Command::List => None,
        Command::Delete(id) => Some(coordinator.delete_request(id).await?),
        Command::Reject(id) => Some(coordinator.reject_request(id).await?),
    };

    if let Some(Outcome::Failed(failure)) = &outcome {
        tracing::debug!(committed = failure.is_committed(), "action failed");
    }

    let state = coordinator.snapshot();
    print_section("Rides I Created", "No rides created yet.", &state.created);
    print_section("Rides I Accepted", "No rides accepted yet.", &state.accepted);

    Ok(())
}
