use anyhow::anyhow;
use serde_json::{json, Value};
use std::time::Duration;
use traynar::catalog::{self, HistoryFilter};
use traynar::recording::{AudioSource, ConversationType, RecordingSession};
use traynar::screen::ALL_SCREENS;
use traynar::services::{
    process_recording, HistoryStore, MockEvaluator, MockHistory, MockTranscriber, Transcriber,
};
use traynar::theme::{Appearance, Palette, SystemScheme, ThemeMode};
use traynar_cli::pretty::Printer;
use traynar_cli::*;

use colored_json::to_colored_json_auto;
use log::{self, debug};
use std::io::Write;
use structopt::StructOpt;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

type Result<T> = anyhow::Result<T>;

#[derive(StructOpt)]
#[structopt(
    rename_all = "kebab-case",
    about = "Terminal client for Traynar conversation coaching"
)]
struct Opt {
    /// Authentication API host, overriding TRAYNAR_API_HOST
    #[structopt(global = true, long = "--host")]
    host: Option<String>,

    /// "auto", "light" or "dark", overriding TRAYNAR_THEME
    #[structopt(global = true, long = "--theme")]
    theme: Option<ThemeMode>,

    /// Print results as JSON instead of formatted text
    #[structopt(global = true, long)]
    json: bool,

    /// Log more messages. Pass multiple times for ever more verbosity
    ///
    /// By default, it'll only report errors. Passing `-v` one time also prints
    /// warnings, `-vv` enables info logging, `-vvv` debug, and `-vvvv` trace.
    #[structopt(global = true, long, short = "v", parse(from_occurrences))]
    verbose: i8,

    #[structopt(long = "--shell-completions", hidden = true)]
    shell_completions: Option<structopt::clap::Shell>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Log in with a username or email address
    Login {
        #[structopt(long, short)]
        identifier: String,

        #[structopt(long, short, env = "TRAYNAR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Signup {
        #[structopt(long, short)]
        username: String,

        #[structopt(long)]
        first_name: String,

        #[structopt(long)]
        last_name: String,

        #[structopt(long, short)]
        email: String,

        /// Ten digits, optionally prefixed by a country code ("+44 7700900123")
        #[structopt(long)]
        phone: PhoneArg,

        #[structopt(long, short)]
        location: String,
    },

    /// Record a conversation, then transcribe and evaluate it
    Record {
        #[structopt(long, short, default_value = "5")]
        seconds: u64,

        #[structopt(long = "--type", short = "t", default_value = "morning-huddle")]
        conversation_type: ConversationType,
    },

    /// Transcribe an existing recording
    Transcribe {
        uri: String,

        #[structopt(long = "--type", short = "t", default_value = "morning-huddle")]
        conversation_type: ConversationType,
    },

    /// Transcribe and evaluate an existing recording
    Evaluate {
        uri: String,

        #[structopt(long = "--type", short = "t", default_value = "morning-huddle")]
        conversation_type: ConversationType,
    },

    /// Past recordings, optionally filtered
    History {
        #[structopt(long, short)]
        search: Option<String>,

        #[structopt(long = "--type", short = "t")]
        conversation_type: Option<ConversationType>,
    },

    /// Learning frameworks; name one to see its lessons
    Learn { name: Option<String> },

    Notifications,

    /// Dashboard
    Home,

    Profile {
        #[structopt(long)]
        toggle_notifications: bool,
    },

    /// List navigable screens
    Screens,

    /// Show a screen by its route, like "/history" or "(tabs)/lms"
    Go { route: Screen },

    /// Summarize configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let opt = Opt::from_args();

    let log_level = match opt.verbose {
        std::i8::MIN..=-1 => "none",
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        4..=std::i8::MAX => "trace",
    };
    // hyper logging is very verbose, so crank that down even if everything else is more verbose
    let log_filter = format!("{},hyper=error", log_level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_timestamp(None)
        .init();

    debug!("Args parsed, starting up");

    #[cfg(windows)]
    colored_json::enable_ansi_support();

    if let Some(shell) = opt.shell_completions {
        Opt::clap().gen_completions_to("traynar", shell, &mut std::io::stdout());
        std::process::exit(0);
    }

    match run(opt).await {
        Ok(true) => Ok(()),
        // the alert or field errors were already shown
        Ok(false) => std::process::exit(2),
        Err(err) => {
            // Be graceful about some errors
            if let Some(io_err) = err.root_cause().downcast_ref::<std::io::Error>() {
                if let std::io::ErrorKind::BrokenPipe = io_err.kind() {
                    debug!("got BrokenPipe error, assuming stdout closed as expected and exiting with success");
                    std::process::exit(0);
                }
            }
            let mut color_stderr = StandardStream::stderr(color_choice(atty::is(
                atty::Stream::Stderr,
            )));
            color_stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            eprintln!("Error: {:?}", err);
            color_stderr.set_color(&ColorSpec::new())?;
            std::process::exit(1);
        }
    }
}

fn print_result_json(result: Option<Value>) -> Result<()> {
    if let Some(val) = result {
        writeln!(&mut std::io::stdout(), "{}", to_colored_json_auto(&val)?)?
    };
    Ok(())
}

type CliFlow = AuthFlow<TerminalNavigator, TerminalAlerter>;

fn auth_flow(config: &Config, choice: ColorChoice, palette: Palette) -> Result<CliFlow> {
    let client = CredentialClient::from_config(config)?;
    Ok(AuthFlow::new(
        config,
        client,
        TerminalNavigator::default(),
        TerminalAlerter::new(choice, palette),
    ))
}

/// Prints what a finished submission led to; returns whether it succeeded.
fn report_submission(
    flow: &CliFlow,
    submission: Submission,
    printer: &Printer,
    json: bool,
) -> Result<bool> {
    match submission {
        Submission::Completed(outcome) => {
            let screen = flow.navigator().current();
            if json {
                print_result_json(Some(json!({
                    "outcome": outcome.kind(),
                    "message": outcome.message(),
                    "screen": screen.map(|s| s.path()),
                })))?;
            } else if let Some(screen) = screen {
                println!("-> {:?} ({})", screen, screen.path());
            }
            Ok(outcome.is_success())
        }
        Submission::Invalid(errors) => {
            if json {
                let fields: serde_json::Map<String, Value> = errors
                    .iter()
                    .map(|(field, msg)| (field.label().to_string(), json!(msg)))
                    .collect();
                print_result_json(Some(json!({ "outcome": "invalid", "fields": fields })))?;
            } else {
                printer.pp_field_errors(&errors)?;
            }
            Ok(false)
        }
        Submission::Rejected => Err(anyhow!("a submission is already in flight")),
    }
}

async fn run(opt: Opt) -> Result<bool> {
    let mut config = Config::from_env()?;
    if let Some(ref host) = opt.host {
        config = config.with_api_host(host)?;
    }
    if let Some(theme) = opt.theme {
        config.theme = theme;
    }
    let system = std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| SystemScheme::from_colorfgbg(&v));
    let palette = Palette::resolve(config.theme, system);
    let stdout_choice = color_choice(atty::is(atty::Stream::Stdout));
    let stderr_choice = color_choice(atty::is(atty::Stream::Stderr));
    let printer = Printer::new(stdout_choice, palette);
    let delays = config.mock_delays;

    let cmd = match opt.cmd {
        Command::Go { route } => command_for(route)?,
        cmd => cmd,
    };
    match cmd {
        Command::Status => {
            let appearance = Appearance::resolve(config.theme, system);
            println!("Configuration");
            println!("  TRAYNAR_API_HOST: {}", config.api_host);
            println!("  TRAYNAR_LOGIN_TIMEOUT_MS: {}", config.login_timeout.as_millis());
            println!("  TRAYNAR_SIGNUP_TIMEOUT_MS: {}", config.signup_timeout.as_millis());
            println!("  TRAYNAR_THEME: {} ({:?})", config.theme, appearance);
            println!("  TRAYNAR_COUNTRY_CODE: {}", config.default_country_code);
            println!(
                "  mock delays: transcription {:?}, evaluation {:?}, history {:?}",
                delays.transcription, delays.evaluation, delays.history
            );
            Ok(true)
        }
        Command::Login {
            identifier,
            password,
        } => {
            let flow = auth_flow(&config, stderr_choice, palette)?;
            let submission = flow.submit_login(&identifier, &password).await;
            report_submission(&flow, submission, &printer, opt.json)
        }
        Command::Signup {
            username,
            first_name,
            last_name,
            email,
            phone,
            location,
        } => {
            let mut form = SignupForm::new(&config.default_country_code);
            form.username = username;
            form.first_name = first_name;
            form.last_name = last_name;
            form.email = email;
            if let Some(code) = phone.country_code {
                form.country_code = code;
            }
            form.phone = phone.number;
            form.location = location;
            let flow = auth_flow(&config, stderr_choice, palette)?;
            let submission = flow.submit_signup(&form).await;
            report_submission(&flow, submission, &printer, opt.json)
        }
        Command::Record {
            seconds,
            conversation_type,
        } => {
            let mut session = RecordingSession::default();
            session.toggle();
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            // first tick completes immediately
            ticker.tick().await;
            while session.elapsed_secs() < seconds {
                eprint!("\r{} {}", session.status_label(), session.clock());
                ticker.tick().await;
                session.tick();
            }
            eprintln!("\r{} {}", session.status_label(), session.clock());
            let uri = format!("recording://{}", created_at_now()?);
            let audio = session.finish(&uri, conversation_type);
            evaluate(audio, &config, stderr_choice, &printer, opt.json).await?;
            Ok(true)
        }
        Command::Transcribe {
            uri,
            conversation_type,
        } => {
            let audio = AudioSource {
                uri,
                conversation_type,
            };
            let transcript = MockTranscriber::new(&delays).transcribe(&audio).await?;
            if opt.json {
                print_result_json(Some(serde_json::to_value(&transcript)?))?;
            } else {
                printer.pp_transcript(&transcript)?;
            }
            Ok(true)
        }
        Command::Evaluate {
            uri,
            conversation_type,
        } => {
            let audio = AudioSource {
                uri,
                conversation_type,
            };
            evaluate(audio, &config, stderr_choice, &printer, opt.json).await?;
            Ok(true)
        }
        Command::History {
            search,
            conversation_type,
        } => {
            let entries = MockHistory::new(&delays).recordings().await?;
            let filter = HistoryFilter {
                query: search.unwrap_or_default(),
                conversation_type,
            };
            let shown = filter.apply(&entries);
            if opt.json {
                print_result_json(Some(serde_json::to_value(&shown)?))?;
            } else {
                printer.pp_history(&shown, time::OffsetDateTime::now_utc().date())?;
            }
            Ok(true)
        }
        Command::Learn { name } => {
            let frameworks = match name {
                Some(ref name) => vec![catalog::find_framework(name)
                    .ok_or(anyhow!("no learning framework named {}", name))?],
                None => catalog::learning_frameworks(),
            };
            if opt.json {
                print_result_json(Some(serde_json::to_value(&frameworks)?))?;
            } else {
                for f in frameworks.iter() {
                    printer.pp_framework(f, name.is_some())?;
                }
            }
            Ok(true)
        }
        Command::Notifications => {
            let sections = catalog::notifications();
            if opt.json {
                print_result_json(Some(serde_json::to_value(&sections)?))?;
            } else {
                printer.pp_notifications(&sections)?;
            }
            Ok(true)
        }
        Command::Home => {
            let dash = catalog::dashboard();
            if opt.json {
                print_result_json(Some(serde_json::to_value(&dash)?))?;
            } else {
                printer.pp_dashboard(&dash)?;
            }
            Ok(true)
        }
        Command::Profile {
            toggle_notifications,
        } => {
            let mut me = catalog::profile();
            if toggle_notifications {
                me.toggle_notifications();
            }
            if opt.json {
                print_result_json(Some(serde_json::to_value(&me)?))?;
            } else {
                printer.pp_profile(&me)?;
            }
            Ok(true)
        }
        Command::Screens => {
            if opt.json {
                let screens: Vec<Value> = ALL_SCREENS
                    .iter()
                    .map(|s| {
                        json!({
                            "name": format!("{:?}", s),
                            "path": s.path(),
                            "tab": s.tab_title(),
                        })
                    })
                    .collect();
                print_result_json(Some(Value::Array(screens)))?;
            } else {
                for s in ALL_SCREENS.iter() {
                    let name = format!("{:?}", s);
                    match s.tab_title() {
                        Some(tab) => println!("{:<20}{:<20}[{}]", name, s.path(), tab),
                        None => println!("{:<20}{}", name, s.path()),
                    }
                }
            }
            Ok(true)
        }
        Command::Go { route } => Err(anyhow!("no sub-command renders {}", route)),
    }
}

/// The sub-command that renders the screen at a route. Screens that need input first (login,
/// signup, recording and its results) have none.
fn command_for(screen: Screen) -> Result<Command> {
    match screen {
        Screen::Onboarding => Ok(Command::Screens),
        Screen::Home => Ok(Command::Home),
        Screen::History => Ok(Command::History {
            search: None,
            conversation_type: None,
        }),
        Screen::Learn => Ok(Command::Learn { name: None }),
        Screen::Notifications => Ok(Command::Notifications),
        Screen::Profile => Ok(Command::Profile {
            toggle_notifications: false,
        }),
        other => Err(anyhow!("{} needs input first, use its own sub-command", other)),
    }
}

async fn evaluate(
    audio: AudioSource,
    config: &Config,
    choice: ColorChoice,
    printer: &Printer,
    json: bool,
) -> Result<()> {
    let done = process_recording(
        &MockTranscriber::new(&config.mock_delays),
        &MockEvaluator::new(&config.mock_delays),
        &TerminalNotifier::new(choice),
        audio,
    )
    .await?;
    if json {
        print_result_json(Some(serde_json::to_value(&done)?))?;
    } else {
        printer.pp_transcript(&done.transcript)?;
        printer.pp_report(&done.report)?;
    }
    Ok(())
}

#[test]
fn test_go_to_route() {
    let opt = Opt::from_iter_safe(["traynar", "go", "(tabs)/history"]).unwrap();
    assert!(matches!(
        opt.cmd,
        Command::Go {
            route: Screen::History
        }
    ));
    assert!(Opt::from_iter_safe(["traynar", "go", "/settings"]).is_err());

    assert!(matches!(
        command_for(Screen::History),
        Ok(Command::History {
            search: None,
            conversation_type: None
        })
    ));
    assert!(matches!(command_for(Screen::Learn), Ok(Command::Learn { name: None })));
    assert!(matches!(command_for(Screen::Onboarding), Ok(Command::Screens)));
    assert!(command_for(Screen::Login).is_err());
    assert!(command_for(Screen::EvaluationResult).is_err());
}
