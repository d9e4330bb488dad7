mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::dir::{self, DATA_DIR_ENV};
use crate::io::kv::FileStore;
use crate::io::lock::DirLock;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::session::Session;
use crate::logging;
use crate::model::config::Config;
use crate::model::task::Location;
use crate::ops::import;
use crate::ops::store::Touched;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let dir = cli.dir;

    // Init runs before data directory discovery
    let command = match cli.command {
        Commands::Init(args) => return cmd_init(args, dir.as_deref()),
        command => command,
    };

    let ctx = Context::open(dir.as_deref(), json)?;
    match command {
        Commands::Init(_) => unreachable!("handled above"),

        // Read commands
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Inbox(args) => cmd_inbox(&ctx, args),
        Commands::Projects(args) => cmd_projects(&ctx, args),
        Commands::Now(args) => cmd_now(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),

        // Write commands
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Focus(args) => cmd_focus(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Done(args) => cmd_done(&ctx, args),
        Commands::Drop(args) => cmd_drop(&ctx, args),
        Commands::Reorder(args) => cmd_reorder(&ctx, args),
        Commands::Notes(args) => cmd_notes(&ctx, args),

        // Maintenance
        Commands::Import(args) => cmd_import(&ctx, args),
        Commands::Recovery(args) => cmd_recovery(&ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Everything a command needs besides its arguments
struct Context {
    data_dir: PathBuf,
    config: Config,
    json: bool,
}

impl Context {
    fn open(dir_override: Option<&str>, json: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let cwd = std::env::current_dir()?;
        let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let data_dir =
            dir::resolve_data_dir(dir_override.map(Path::new), env_dir.as_deref(), &cwd)?;
        let config = config_io::read_config(&data_dir)?;

        let env_level = std::env::var(logging::LOG_LEVEL_ENV).ok();
        let level = logging::effective_level(env_level.as_deref(), &config.log.level);
        if let Err(e) = logging::init_logging(&level, &data_dir.join("logs")) {
            eprintln!("warning: logging disabled: {}", e);
        }

        Ok(Context {
            data_dir,
            config,
            json,
        })
    }

    fn session(&self) -> Result<Session<FileStore>, Box<dyn std::error::Error>> {
        Ok(Session::load(
            FileStore::new(&self.data_dir),
            Some(&self.data_dir),
        )?)
    }

    fn lock(&self) -> Result<DirLock, Box<dyn std::error::Error>> {
        Ok(DirLock::acquire_default(&self.data_dir)?)
    }

    fn view(&self, open_only: bool) -> View {
        View {
            id_chars: self.config.display.id_chars,
            show_completed: self.config.display.show_completed && !open_only,
        }
    }

    fn short<'a>(&self, id: &'a str) -> &'a str {
        short_id(id, self.config.display.id_chars)
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Project names are accepted with or without the leading `#`
fn project_name(name: &str) -> &str {
    name.trim().trim_start_matches('#')
}

fn log_command(name: &str, touched: Touched) {
    info!(
        "event=command name={} status=ok inbox={} projects={} now={} notes={}",
        name, touched.inbox, touched.projects, touched.now, touched.notes
    );
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let session = ctx.session()?;
    let store = session.store();
    let view = ctx.view(args.open);
    if ctx.json {
        return print_json(&list_to_json(store, view));
    }
    let mut lines = format_inbox(store, view);
    lines.push(String::new());
    lines.extend(format_projects(store, view));
    lines.push(String::new());
    lines.extend(format_now(store, view));
    print_lines(&lines);
    Ok(())
}

fn cmd_inbox(ctx: &Context, args: ListArgs) -> CmdResult {
    let session = ctx.session()?;
    let view = ctx.view(args.open);
    if ctx.json {
        return print_json(&list_to_json(session.store(), view).inbox);
    }
    print_lines(&format_inbox(session.store(), view));
    Ok(())
}

fn cmd_projects(ctx: &Context, args: ProjectsArgs) -> CmdResult {
    let session = ctx.session()?;
    let store = session.store();
    let view = ctx.view(args.open);

    let Some(name) = args.name.as_deref().map(project_name) else {
        if ctx.json {
            return print_json(&projects_to_json(store, view));
        }
        print_lines(&format_projects(store, view));
        return Ok(());
    };

    let tasks = store
        .project(name)
        .ok_or_else(|| format!("no project named #{}", name))?;
    if ctx.json {
        let project = projects_to_json(store, view)
            .into_iter()
            .find(|p| p.name == name);
        return print_json(&project);
    }
    print_lines(&format_project(name, tasks, view));
    Ok(())
}

fn cmd_now(ctx: &Context, args: ListArgs) -> CmdResult {
    let session = ctx.session()?;
    let view = ctx.view(args.open);
    if ctx.json {
        return print_json(&now_to_json(&session.store().now_groups(), view));
    }
    print_lines(&format_now(session.store(), view));
    Ok(())
}

fn cmd_show(ctx: &Context, args: IdArgs) -> CmdResult {
    let session = ctx.session()?;
    let store = session.store();
    let id = store.resolve_id(&args.id)?;
    let copies = store.find(&id);
    if ctx.json {
        let copies: Vec<CopyJson> = copies
            .iter()
            .map(|(location, task)| CopyJson {
                location: location.to_string(),
                task,
            })
            .collect();
        return print_json(&copies);
    }
    print_lines(&format_copies(&copies));
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let text = args.text.join(" ");

    let Some(added) = session.apply(|s| s.add(&text)) else {
        return Err("nothing to add: task text is empty".into());
    };
    log_command("add", added.touched);

    if ctx.json {
        return print_json(&added_to_json(&added));
    }
    let placed: Vec<String> = added.placed.iter().map(Location::to_string).collect();
    println!("added {} to {}", ctx.short(&added.id), placed.join(", "));
    Ok(())
}

fn cmd_focus(ctx: &Context, args: FocusArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let id = session.store().resolve_id(&args.id)?;
    let from = args.from.as_deref().map(project_name);

    let touched = session.apply(|s| s.move_to_now(&id, from));
    if touched.is_empty() {
        let origin = from.map_or("inbox".to_string(), |p| format!("#{}", p));
        return Err(format!("task {} is not in {}", ctx.short(&id), origin).into());
    }
    log_command("focus", touched);
    println!("moved {} to now", ctx.short(&id));
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let id = session.store().resolve_id(&args.id)?;
    let text = args.text.join(" ");

    let touched = session.apply(|s| s.edit(&id, &text));
    if touched.is_empty() {
        warn!("event=command name=edit status=discarded reason=empty_text");
        println!("edit discarded: text is empty");
        return Ok(());
    }
    log_command("edit", touched);
    let placed: Vec<String> = session
        .store()
        .find(&id)
        .iter()
        .map(|(location, _)| location.to_string())
        .collect();
    println!("updated {} in {}", ctx.short(&id), placed.join(", "));
    Ok(())
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let id = session.store().resolve_id(&args.id)?;
    let touched = session.apply(|s| s.delete(&id));
    log_command("rm", touched);
    println!("deleted {}", ctx.short(&id));
    Ok(())
}

fn cmd_done(ctx: &Context, args: DoneArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let id = session.store().resolve_id(&args.id)?;

    let touched = match args.location.as_deref().map(Location::parse) {
        Some(location) => {
            let touched = session.apply(|s| s.toggle_complete_at(&id, &location));
            if touched.is_empty() {
                return Err(format!("task {} is not in {}", ctx.short(&id), location).into());
            }
            touched
        }
        None => session.apply(|s| s.toggle_complete(&id)),
    };
    log_command("done", touched);

    for (location, task) in session.store().find(&id) {
        let state = if task.completed { "done" } else { "open" };
        println!("{} {} in {}", ctx.short(&id), state, location);
    }
    Ok(())
}

fn cmd_drop(ctx: &Context, args: DropArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let name = project_name(&args.name);
    let count = session.store().project(name).map_or(0, <[_]>::len);

    let touched = session.apply(|s| s.delete_project(name));
    if touched.is_empty() {
        return Err(format!("no project named #{}", name).into());
    }
    log_command("drop", touched);
    println!("dropped #{}: {} task(s) moved to inbox", name, count);
    Ok(())
}

fn cmd_reorder(ctx: &Context, args: ReorderArgs) -> CmdResult {
    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let project = project_name(&args.project);
    let target = project_name(&args.target);
    for name in [project, target] {
        if session.store().project(name).is_none() {
            return Err(format!("no project named #{}", name).into());
        }
    }

    let touched = session.apply(|s| s.reorder_project(project, target));
    log_command("reorder", touched);
    let order: Vec<String> = session
        .store()
        .project_order()
        .iter()
        .map(|name| format!("#{}", name))
        .collect();
    println!("{}", order.join(" "));
    Ok(())
}

fn cmd_notes(ctx: &Context, args: NotesArgs) -> CmdResult {
    let text = args.text.join(" ");
    if text.is_empty() && !args.clear {
        let session = ctx.session()?;
        let notes = session.store().notes();
        if ctx.json {
            return print_json(&serde_json::json!({ "notes": notes }));
        }
        if notes.is_empty() {
            println!("(no notes)");
        } else {
            println!("{}", notes);
        }
        return Ok(());
    }

    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    let touched = if args.clear {
        session.apply(|s| s.set_notes(""))
    } else if args.append {
        session.apply(|s| s.append_notes(&text))
    } else {
        session.apply(|s| s.set_notes(&text))
    };
    log_command("notes", touched);
    println!("notes saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_import(ctx: &Context, args: ImportArgs) -> CmdResult {
    let content = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("cannot read {}: {}", args.file, e))?;
    let imported = import::import_local_storage(&content)?;

    let _lock = ctx.lock()?;
    let mut session = ctx.session()?;
    if !session.store().is_empty() || !session.store().notes().is_empty() {
        // The replaced state stays recoverable
        let previous = serde_json::to_string_pretty(&state_to_json(session.store()))?;
        recovery::log_recovery(
            &ctx.data_dir,
            RecoveryEntry::new(RecoveryCategory::Import, "state replaced by import", previous)
                .field("Source", args.file.as_str()),
        );
    }

    let touched = session.apply(|s| s.replace(imported));
    log_command("import", touched);
    let store = session.store();
    println!(
        "imported {} inbox, {} project(s), {} now",
        store.inbox().len(),
        store.projects().len(),
        store.now().len()
    );
    Ok(())
}

fn cmd_recovery(ctx: &Context, args: RecoveryArgs) -> CmdResult {
    if args.prune {
        let _lock = ctx.lock()?;
        let removed = recovery::prune_recovery(&ctx.data_dir, None)?;
        println!("pruned {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&ctx.data_dir, Some(args.limit));
    if ctx.json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        return print_json(&values);
    }
    if entries.is_empty() {
        println!("(recovery log is empty)");
    }
    for entry in &entries {
        print!("{}", entry.to_markdown());
    }
    Ok(())
}
