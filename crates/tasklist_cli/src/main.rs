use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tasklist_cli::cli::{Cli, Command, collect_overrides, parse_clock, parse_days, resolve_position};
use tasklist_cli::render::{schedule_label, task_json, task_table};
use tasklist_cli::shell::{self, Line};
use tasklist_core::config::{Config, load_config};
use tasklist_core::error::AppError;
use tasklist_core::notify::{Notifier, notifier_from_env};
use tasklist_core::storage::JsonFileStore;
use tasklist_core::{Clock, SystemClock, TaskStore, TickReport};
use time::UtcOffset;
use time::macros::format_description;

struct Session {
    store: TaskStore<JsonFileStore>,
    config: Config,
    interactive: bool,
}

impl Session {
    fn open(interactive: bool) -> Result<Self, AppError> {
        let loaded = load_config();
        if let Some(err) = loaded.warning {
            eprintln!("WARNING: ignoring config: {}", err);
        }

        let mut store = TaskStore::open(JsonFileStore::open_default()?)?;
        store.subscribe(|change| tracing::debug!(?change, "store changed"));

        Ok(Self {
            store,
            config: loaded.config,
            interactive,
        })
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn offset_label(offset: UtcOffset) -> String {
    if offset == UtcOffset::UTC {
        return "UTC".to_string();
    }
    offset
        .format(format_description!(
            "[offset_hour sign:mandatory]:[offset_minute]"
        ))
        .unwrap_or_else(|_| offset.to_string())
}

fn visibility_label(hidden: bool) -> &'static str {
    if hidden { "hidden" } else { "visible" }
}

fn print_visibility(hidden: bool, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "hidden": hidden }));
    } else {
        println!("To-do list is now {}", visibility_label(hidden));
    }
}

fn print_tick(report: &TickReport, json: bool) {
    if json {
        let positions: Vec<usize> = report.reset.iter().map(|index| index + 1).collect();
        println!(
            "{}",
            serde_json::json!({
                "time": report.time,
                "day": report.day,
                "reset": positions,
            })
        );
    } else {
        println!(
            "Checked at {} ({}); reset {} task(s)",
            report.time,
            report.day,
            report.reset.len()
        );
    }
}

fn read_import_source(file: Option<&std::path::Path>, interactive: bool) -> Result<String, AppError> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| AppError::storage(format!("{}: {}", path.display(), err))),
        None if interactive => Err(AppError::invalid_input(
            "import needs a file in interactive mode",
        )),
        None => io::read_to_string(io::stdin()).map_err(|err| AppError::storage(err.to_string())),
    }
}

fn watch(session: &mut Session, config: &Config, json: bool) -> Result<(), AppError> {
    let scheduler = config.scheduler()?;
    let notifier = notifier_from_env();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::invalid_data(format!("failed to start runtime: {err}")))?;

    if !json {
        println!(
            "Watching for scheduled resets every {}s ({}). Press Ctrl-C to stop.",
            scheduler.interval().as_secs(),
            offset_label(scheduler.offset())
        );
    }

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let on_tick = |store: &TaskStore<JsonFileStore>, report: &TickReport| {
        print_tick(report, json);
        for index in &report.reset {
            let Some(task) = store.task(*index) else {
                continue;
            };
            if !json {
                println!("Reset task #{}: {}", index + 1, task.text);
            }
            if let Err(err) = notifier.notify(task) {
                tracing::warn!(error = %err, "notification failed");
            }
        }
    };

    let ticks = runtime.block_on(scheduler.run(&mut session.store, &SystemClock, shutdown, on_tick));
    if !json {
        println!("Stopped after {ticks} check(s)");
    }
    Ok(())
}

fn print_help() {
    println!("{}", Cli::command().render_help());
}

fn run_command(cli: Cli, session: &mut Session) -> Result<(), AppError> {
    let config = session.config.with_overrides(&collect_overrides(&cli.config_override)?);
    let json = cli.json;
    let store = &mut session.store;

    match cli.command {
        Command::Add { text } => match store.add(text.as_deref().unwrap_or_default())? {
            Some(index) => {
                let task = &store.tasks()[index];
                if json {
                    println!("{}", task_json(index + 1, task));
                } else {
                    println!("Added task #{}: {}", index + 1, task.text);
                }
            }
            None => {
                if json {
                    println!("null");
                } else {
                    println!("Nothing added: task text is blank");
                }
            }
        },
        Command::Remove { position } => {
            let index = resolve_position(position, store.len())?;
            let task = store.remove(index)?;
            if json {
                println!("{}", task_json(position, &task));
            } else {
                println!("Removed task #{}: {}", position, task.text);
            }
        }
        Command::Done { position, undo } => {
            let index = resolve_position(position, store.len())?;
            store.toggle_done(index, !undo)?;
            let task = &store.tasks()[index];
            if json {
                println!("{}", task_json(position, task));
            } else if undo {
                println!("Unchecked task #{}: {}", position, task.text);
            } else {
                println!("Checked task #{}: {}", position, task.text);
            }
        }
        Command::Edit { position, text } => {
            let index = resolve_position(position, store.len())?;
            store.set_text(index, &text)?;
            let task = &store.tasks()[index];
            if json {
                println!("{}", task_json(position, task));
            } else {
                println!("Updated task #{}: {}", position, task.text);
            }
        }
        Command::Move { from, to } => {
            let from_index = resolve_position(from, store.len())?;
            let to_index = resolve_position(to, store.len())?;
            store.reorder(from_index, to_index)?;
            let task = &store.tasks()[to_index];
            if json {
                println!("{}", task_json(to, task));
            } else {
                println!("Moved task #{} to #{}: {}", from, to, task.text);
            }
        }
        Command::Schedule {
            position,
            time,
            days,
        } => {
            let index = resolve_position(position, store.len())?;
            let time = parse_clock(&time)?;
            let days = parse_days(&days)?;
            store.set_schedule(index, &time, days)?;
            let task = &store.tasks()[index];
            if json {
                println!("{}", task_json(position, task));
            } else {
                println!(
                    "Scheduled task #{}: {} resets at {}",
                    position,
                    task.text,
                    schedule_label(task.schedule.as_ref())
                );
            }
        }
        Command::Unschedule { position } => {
            let index = resolve_position(position, store.len())?;
            store.clear_schedule(index)?;
            let task = &store.tasks()[index];
            if json {
                println!("{}", task_json(position, task));
            } else {
                println!("Cleared schedule of task #{}: {}", position, task.text);
            }
        }
        Command::List => {
            if json {
                let payload: Vec<serde_json::Value> = store
                    .tasks()
                    .iter()
                    .enumerate()
                    .map(|(index, task)| task_json(index + 1, task))
                    .collect();
                println!("{}", serde_json::Value::Array(payload));
            } else if store.is_empty() {
                println!("No tasks.");
            } else {
                println!("{}", task_table(store.tasks(), &config.theme().palette()));
            }
        }
        Command::Export => {
            println!("{}", store.export_text()?);
        }
        Command::Import { file } => {
            let content = read_import_source(file.as_deref(), session.interactive)?;
            store.import_snapshot(&content)?;
            if json {
                println!("{}", store.export_text()?);
            } else {
                println!("Imported {} task(s)", store.len());
            }
        }
        Command::Toggle => {
            let hidden = store.toggle_visibility()?;
            print_visibility(hidden, json);
        }
        Command::Hide => {
            store.set_hidden(true)?;
            print_visibility(true, json);
        }
        Command::Show => {
            store.set_hidden(false)?;
            print_visibility(false, json);
        }
        Command::Status => {
            let settings = store.settings();
            let last_checked = store.last_checked();
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "hidden": settings.hidden,
                        "lastCheckedTime": last_checked,
                        "tasks": store.len(),
                    })
                );
            } else {
                let palette = config.theme().palette();
                println!("To-do list: {}", visibility_label(settings.hidden));
                println!("Tasks: {}", store.len());
                println!(
                    "Last check: {}",
                    palette.highlight(&last_checked.clock_label(local_offset()))
                );
            }
        }
        Command::Tick => {
            let scheduler = config.scheduler()?;
            let report = scheduler.tick(store, SystemClock.now())?;
            print_tick(&report, json);
        }
        Command::Watch => watch(session, &config, json)?,
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut session = Session::open(true)?;

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|err| AppError::storage(err.to_string()))?;
        let outcome = match shell::read_line(&line) {
            Ok(Line::Blank) => continue,
            Ok(Line::Exit) => break,
            Ok(Line::Help) => {
                print_help();
                continue;
            }
            Ok(Line::Run(cli)) => run_command(cli, &mut session),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            eprintln!("ERROR: {err}");
        }
    }

    Ok(())
}

fn init_tracing() {
    if std::env::var("TASKLIST_DEBUG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter("tasklist=debug,tasklist_cli=debug,tasklist_core=debug")
            .with_writer(io::stderr)
            .init();
    }
}

fn fail(err: AppError) -> ! {
    eprintln!("ERROR: {err}");
    std::process::exit(1);
}

fn main() {
    init_tracing();

    if std::env::args_os().len() <= 1 {
        if let Err(err) = run_interactive() {
            fail(err);
        }
        return;
    }

    let cli = Cli::try_parse().unwrap_or_else(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => fail(shell::parse_failure(err)),
    });

    if let Err(err) = Session::open(false).and_then(|mut session| run_command(cli, &mut session)) {
        fail(err);
    }
}
