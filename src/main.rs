use std::process::ExitCode;

use clap::{Parser, Subcommand};

use planner_auth::{GoogleOAuth2Provider, TokenStorage, GOOGLE_SERVICE};
use planner_calendar::{
    lane_count, week_start_for, CalendarClient, CalendarError, CivilDate, MonthBar, Planner,
    PlannerCalendar,
};
use planner_core::{AppError, AuthError, Config, ConfigError, ReqwestErrorExt};

#[derive(Parser)]
#[command(name = "planner", version, about = "Year planner for Google Calendar all-day events")]
struct Cli {
    /// Print bars as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with Google (read-only calendar access)
    Login,
    /// Revoke and forget the stored Google token
    Logout,
    /// List calendars with their colors and access role
    Calendars,
    /// Lay out one month of the planned year
    Month {
        /// Defaults to `planner.year` from the config, then the current year
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },
    /// Lay out the week containing a date
    Week {
        /// Any day of the week, as YYYY-MM-DD
        #[arg(long)]
        start: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = planner_core::init() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, _) = Config::load_validated().map_err(config_error)?;
    let storage = TokenStorage::new()?;
    let provider = GoogleOAuth2Provider::new(
        config.google.client_id.clone(),
        config.google.client_secret.clone(),
    );

    match cli.command {
        Command::Login => {
            if !config.google.is_configured() {
                return Err(ConfigError::MissingSetting("google.client_id".into()).into());
            }
            provider
                .sign_in(&storage, config.google.redirect_port)
                .await
                .map_err(|e| AuthError::OAuthFailed(format!("{e:#}")))?;
            println!("Signed in to Google.");
        }
        Command::Logout => {
            provider.sign_out(&storage).await?;
            println!("Signed out.");
        }
        Command::Calendars => {
            let client = client(&config, &provider, &storage).await?;
            let calendars = client.list_calendars().await.map_err(calendar_error)?;
            for cal in &calendars {
                println!(
                    "{:<40} {} {:?}{}",
                    cal.title,
                    cal.background_color,
                    cal.access_role,
                    if cal.primary { " (primary)" } else { "" }
                );
            }
        }
        Command::Month { year, month } => {
            let year = year.unwrap_or_else(|| config.planner.effective_year());
            let (client, calendars) = planner_calendars(&config, &provider, &storage).await?;
            let planner = Planner::load(&client, calendars, year)
                .await
                .map_err(calendar_error)?;
            print_bars(&planner.month_bars(month), cli.json)?;
        }
        Command::Week { start } => {
            let date = CivilDate::parse(&start).map_err(CalendarError::from).map_err(calendar_error)?;
            let week_start = week_start_for(date, config.planner.week_starts_on.day_index());
            let (client, calendars) = planner_calendars(&config, &provider, &storage).await?;
            let planner = Planner::load_week(&client, calendars, week_start)
                .await
                .map_err(calendar_error)?;
            print_bars(&planner.week_bars(week_start), cli.json)?;
        }
    }

    Ok(())
}

/// An authenticated client, refreshing the stored token if it is stale.
async fn client(
    config: &Config,
    provider: &GoogleOAuth2Provider,
    storage: &TokenStorage,
) -> Result<CalendarClient, AppError> {
    if !storage.has_token(GOOGLE_SERVICE) {
        return Err(AuthError::TokenNotFound(GOOGLE_SERVICE.into()).into());
    }
    let token = provider.access_token(storage).await.map_err(|e| {
        tracing::warn!("Could not obtain access token: {e:#}");
        AuthError::TokenExpired
    })?;
    Ok(CalendarClient::with_base_url(&token, &config.api.base_url))
}

/// An authenticated client and the calendars to plan with, in display order.
async fn planner_calendars(
    config: &Config,
    provider: &GoogleOAuth2Provider,
    storage: &TokenStorage,
) -> Result<(CalendarClient, Vec<PlannerCalendar>), AppError> {
    let client = client(config, provider, storage).await?;
    let available = client.list_calendars().await.map_err(calendar_error)?;
    let calendars = select_calendars(available, &config.planner.calendars);
    Ok((client, calendars))
}

/// Configured ids in their configured order, or every selected readable calendar.
fn select_calendars(available: Vec<PlannerCalendar>, wanted: &[String]) -> Vec<PlannerCalendar> {
    if wanted.is_empty() {
        return available
            .into_iter()
            .filter(|c| c.selected && c.can_read_events())
            .collect();
    }

    wanted
        .iter()
        .filter_map(|id| {
            let found = available.iter().find(|c| &c.id == id).cloned();
            if found.is_none() {
                tracing::warn!(calendar = %id, "Configured calendar not in calendar list");
            }
            found
        })
        .collect()
}

fn print_bars(bars: &[MonthBar<'_>], json: bool) -> Result<(), AppError> {
    if json {
        let out = serde_json::to_string_pretty(bars).map_err(anyhow::Error::from)?;
        println!("{out}");
        return Ok(());
    }

    if bars.is_empty() {
        println!("No all-day events.");
        return Ok(());
    }

    println!("{} bars in {} lanes", bars.len(), lane_count(bars));
    for bar in bars {
        println!(
            "lane {:>2}  cols {:>2}..{:<2}  {:<40} {}",
            bar.lane, bar.col_start, bar.col_end, bar.title, bar.background
        );
    }
    Ok(())
}

/// Keep typed config failures; anything else (I/O, missing dirs) is `Other`.
fn config_error(e: anyhow::Error) -> AppError {
    match e.downcast::<ConfigError>() {
        Ok(config) => AppError::Config(config),
        Err(other) => AppError::Other(other),
    }
}

fn calendar_error(e: CalendarError) -> AppError {
    match e {
        CalendarError::TokenExpired => AuthError::TokenExpired.into(),
        CalendarError::AuthRequired => AuthError::Forbidden("calendar.readonly".into()).into(),
        CalendarError::RateLimited(secs) => planner_core::NetworkError::RateLimited(secs).into(),
        CalendarError::NetworkError(e) => e.into_network_error().into(),
        other => AppError::Service(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use planner_calendar::AccessRole;

    fn calendar(id: &str, selected: bool, role: AccessRole) -> PlannerCalendar {
        PlannerCalendar {
            id: id.into(),
            title: id.into(),
            background_color: "#4285f4".into(),
            foreground_color: "#ffffff".into(),
            primary: false,
            selected,
            access_role: role,
        }
    }

    #[test]
    fn test_select_calendars_defaults_to_selected_readable() {
        let available = vec![
            calendar("a", true, AccessRole::Owner),
            calendar("b", false, AccessRole::Reader),
            calendar("c", true, AccessRole::FreeBusyReader),
        ];
        let picked = select_calendars(available, &[]);
        assert_eq!(picked.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_select_calendars_follows_configured_order() {
        let available = vec![
            calendar("a", true, AccessRole::Owner),
            calendar("b", false, AccessRole::Reader),
        ];
        let picked = select_calendars(available, &["b".into(), "missing".into(), "a".into()]);
        assert_eq!(picked.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_calendar_errors_map_to_app_errors() {
        assert!(matches!(
            calendar_error(CalendarError::TokenExpired),
            AppError::Auth(AuthError::TokenExpired)
        ));
        assert!(matches!(
            calendar_error(CalendarError::RateLimited(30)),
            AppError::Network(planner_core::NetworkError::RateLimited(30))
        ));
        assert!(matches!(
            calendar_error(CalendarError::CalendarNotFound("x".into())),
            AppError::Service(_)
        ));
    }

    #[test]
    fn test_config_errors_keep_their_kind() {
        let parse = anyhow::Error::from(ConfigError::ParseError("config.toml: bad".into()));
        assert!(matches!(config_error(parse), AppError::Config(ConfigError::ParseError(_))));

        let io = anyhow::anyhow!("Failed to read config file");
        assert!(matches!(config_error(io), AppError::Other(_)));
    }

    #[test]
    fn test_cli_parses_month() {
        let cli = Cli::try_parse_from(["planner", "month", "--month", "3", "--year", "2024"]).unwrap();
        assert!(matches!(cli.command, Command::Month { year: Some(2024), month: 3 }));
        assert!(Cli::try_parse_from(["planner", "month", "--month", "13"]).is_err());
    }
}
