use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use secrecy::ExposeSecret;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use fitness_agent::api::{ApiClient, DEFAULT_HISTORY_LIMIT};
use fitness_agent::auth::{
    AuthNotice, FileSessionStore, Session, SessionHolder, StaticToken, SupabaseAuth, TokenSource,
};
use fitness_agent::config::{self, AuthConfig, BackendConfig};
use fitness_agent::error::SessionStoreError;
use fitness_agent::flows::{GoalForm, resolve_route, submit_goal};
use fitness_agent::models::{Goal, Profile, TaskCreate, TaskItem};
use fitness_agent::onboarding::{OnboardingStep, OnboardingWizard, WizardOutcome};

#[derive(Parser)]
#[command(name = "fitness-agent", version, about = "Client for the fitness coaching backend")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    Signin(Credentials),
    /// Create an account
    Signup(Credentials),
    /// Sign out and forget the saved session
    Signout,
    /// Show the signed-in user
    Whoami,
    /// Show which screen the account would land on
    Status,
    #[command(subcommand)]
    Goals(GoalsCommand),
    #[command(subcommand)]
    Tasks(TasksCommand),
    /// Send one message to the coach
    Chat {
        message: String,
        #[arg(long)]
        goal_id: Option<String>,
    },
    /// Print the coach conversation
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
        #[arg(long)]
        goal_id: Option<String>,
    },
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Fill in the profile step by step
    Onboard,
}

#[derive(Args)]
struct Credentials {
    #[arg(long)]
    email: String,
    /// Prompted for when neither the flag nor the variable is set
    #[arg(long, env = "FITNESS_AGENT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum GoalsCommand {
    List,
    /// Create a goal and wait for its generated tasks
    Create {
        /// weight_loss, muscle_gain or endurance
        #[arg(long = "type")]
        goal_type: String,
        #[arg(long, default_value = "")]
        target_value: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        target_date: String,
        /// Return right after creation
        #[arg(long)]
        no_wait: bool,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum TasksCommand {
    /// Tasks of one goal
    List { goal_id: String },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        goal_id: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// RFC 3339 timestamp
        #[arg(long)]
        due_at: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = session_store()?;

    match cli.command {
        Command::Signin(creds) => sign_in(&store, creds).await,
        Command::Signup(creds) => sign_up(creds).await,
        Command::Signout => sign_out(&store).await,
        Command::Whoami => whoami(&store).await,
        Command::Status => {
            let client = backend(&store).await?;
            println!("{}", resolve_route(&client).await);
            Ok(())
        }
        Command::Goals(cmd) => goals(&backend(&store).await?, cmd).await,
        Command::Tasks(cmd) => tasks(&backend(&store).await?, cmd).await,
        Command::Chat { message, goal_id } => {
            let client = backend(&store).await?;
            let reply = client.coach_chat(&message, goal_id.as_deref()).await?;
            println!("{}", reply.content);
            Ok(())
        }
        Command::History { limit, goal_id } => {
            let client = backend(&store).await?;
            let history = client.fetch_chat_history(limit, goal_id.as_deref()).await?;
            for message in history.to_chat_messages() {
                println!("{:>9}: {}", message.role.to_string(), message.content);
            }
            Ok(())
        }
        Command::Profile(ProfileCommand::Show) => {
            let client = backend(&store).await?;
            match client.fetch_my_profile().await? {
                Some(profile) => print_profile(&profile),
                None => println!("No profile yet. Run `fitness-agent onboard`."),
            }
            Ok(())
        }
        Command::Onboard => onboard(&backend(&store).await?).await,
    }
}

// ── Session ─────────────────────────────────────────────────────────────

fn session_store() -> Result<FileSessionStore, SessionStoreError> {
    config::session_file_from_env()
        .map(FileSessionStore::new)
        .ok_or(SessionStoreError::NoConfigDir)
}

fn session_holder() -> anyhow::Result<SessionHolder> {
    let auth = AuthConfig::from_env().context("Auth provider is not configured")?;
    Ok(SessionHolder::new(Arc::new(SupabaseAuth::new(&auth)?)))
}

/// Token source for backend calls, refreshing an expired saved session.
async fn token_source(store: &FileSessionStore) -> anyhow::Result<Arc<dyn TokenSource>> {
    let session = store
        .load()
        .await?
        .context("Not signed in. Run `fitness-agent signin` first.")?;

    if !session.is_expired(Utc::now()) {
        return Ok(Arc::new(StaticToken::new(
            session.access_token.expose_secret(),
            session.user.id,
        )));
    }

    let holder = session_holder()?;
    holder.restore(session);
    let refreshed = holder
        .refresh()
        .await
        .context("Session expired; sign in again")?;
    store.save(&refreshed).await?;
    Ok(Arc::new(holder))
}

async fn backend(store: &FileSessionStore) -> anyhow::Result<ApiClient> {
    let config = BackendConfig::from_env()?;
    Ok(ApiClient::new(&config, token_source(store).await?)?)
}

async fn password(creds: &Credentials) -> anyhow::Result<String> {
    if let Some(password) = &creds.password {
        return Ok(password.clone());
    }
    let mut input = stdin_lines();
    prompt("Password: ").await?;
    let line = input.next_line().await?.unwrap_or_default();
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Print an info notice; turn an error notice into a failure.
fn report(notice: Option<AuthNotice>) -> anyhow::Result<()> {
    match notice {
        Some(AuthNotice::Error(text)) => bail!(text),
        Some(AuthNotice::Info(text)) => {
            println!("{text}");
            Ok(())
        }
        None => Ok(()),
    }
}

async fn sign_in(store: &FileSessionStore, creds: Credentials) -> anyhow::Result<()> {
    let holder = session_holder()?;
    let password = password(&creds).await?;
    let notice = holder.sign_in(&creds.email, &password).await;

    if let Some(session) = holder.current() {
        store.save(&session).await?;
        println!("Signed in as {}", display_user(&session));
    }
    report(notice)
}

async fn sign_up(creds: Credentials) -> anyhow::Result<()> {
    let holder = session_holder()?;
    let password = password(&creds).await?;
    report(holder.sign_up(&creds.email, &password).await)
}

async fn sign_out(store: &FileSessionStore) -> anyhow::Result<()> {
    if let Some(session) = store.load().await? {
        let holder = session_holder()?;
        holder.restore(session);
        holder.sign_out().await;
    }
    store.clear().await?;
    println!("Signed out");
    Ok(())
}

async fn whoami(store: &FileSessionStore) -> anyhow::Result<()> {
    match store.load().await? {
        Some(session) => {
            println!("{}", display_user(&session));
            println!("user id: {}", session.user.id);
            if let Some(expires_at) = session.expires_at {
                let state = if session.is_expired(Utc::now()) { "expired" } else { "expires" };
                println!("{state}: {}", expires_at.to_rfc3339());
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

fn display_user(session: &Session) -> &str {
    session.user.email.as_deref().unwrap_or(&session.user.id)
}

// ── Goals & tasks ───────────────────────────────────────────────────────

async fn goals(client: &ApiClient, cmd: GoalsCommand) -> anyhow::Result<()> {
    match cmd {
        GoalsCommand::List => {
            let goals = client.list_goals().await?;
            if goals.is_empty() {
                println!("No goals yet.");
            }
            for goal in &goals {
                print_goal(goal);
            }
        }
        GoalsCommand::Create {
            goal_type,
            target_value,
            target_date,
            no_wait,
        } => {
            let create = GoalForm {
                goal_type,
                target_value,
                target_date,
            }
            .to_create()?;

            if no_wait {
                print_goal(&client.create_goal(&create).await?);
                return Ok(());
            }

            let policy = config::poll_policy_from_env()?;
            eprintln!(
                "Creating goal and waiting up to {}s for your plan...",
                policy.max_wait().as_secs()
            );
            let setup = submit_goal(client, &create, policy).await?;
            print_goal(&setup.goal);
            if setup.tasks_generated {
                print_tasks(&setup.tasks);
            } else {
                println!(
                    "Tasks are still being generated. Check again with `fitness-agent tasks list {}`.",
                    setup.goal.id
                );
            }
        }
        GoalsCommand::Delete { id } => {
            client.delete_goal(&id).await?;
            println!("Deleted goal {id}");
        }
    }
    Ok(())
}

async fn tasks(client: &ApiClient, cmd: TasksCommand) -> anyhow::Result<()> {
    match cmd {
        TasksCommand::List { goal_id } => {
            let tasks = client.list_goal_tasks(&goal_id).await?;
            if tasks.is_empty() {
                println!("No tasks yet.");
            }
            print_tasks(&tasks);
        }
        TasksCommand::Add {
            title,
            goal_id,
            description,
            due_at,
        } => {
            let mut create = TaskCreate::new(title);
            if let Some(goal_id) = goal_id {
                create = create.for_goal(goal_id);
            }
            if let Some(description) = description {
                create = create.with_description(description);
            }
            if let Some(due_at) = due_at {
                create = create.with_due_at(due_at);
            }
            print_tasks(&[client.create_task(&create).await?]);
        }
    }
    Ok(())
}

fn print_goal(goal: &Goal) {
    let mut line = format!("{}  {}", goal.id, goal.goal_type.title());
    if let Some(value) = goal.target_value {
        line.push_str(&format!("  target {value}"));
    }
    if let Some(date) = goal.target_date {
        line.push_str(&format!("  by {date}"));
    }
    println!("{line}  [{}]", goal.status);
}

fn print_tasks(tasks: &[TaskItem]) {
    for task in tasks {
        let due = task
            .due_at
            .map(|d| format!("  due {}", d.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        println!("- [{}] {}{due}", task.status, task.title);
        if let Some(description) = &task.description {
            println!("    {description}");
        }
    }
}

fn print_profile(profile: &Profile) {
    let rows = [
        ("Sex", profile.sex.clone()),
        ("DOB", profile.dob.map(|d| d.to_string())),
        ("Height (cm)", profile.height_cm.map(|v| format!("{v:.1}"))),
        ("Weight (kg)", profile.weight_kg.map(|v| format!("{v:.1}"))),
        ("Units", profile.unit_pref.clone()),
        ("Fitness", profile.fitness_level.clone()),
        ("Activity", profile.activity_level.clone()),
        ("Timezone", profile.timezone.clone()),
        ("Locale", profile.locale.clone()),
    ];
    for (label, value) in rows {
        println!("{label:>12}: {}", value.unwrap_or_default());
    }
}

// ── Onboarding ──────────────────────────────────────────────────────────

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}

/// What to show under a step's prompt: the accepted answers and current value.
fn step_hint(wizard: &OnboardingWizard) -> String {
    use fitness_agent::onboarding::{ActivityLevel, FitnessLevel, Sex, UnitPref};

    let draft = wizard.draft();
    match wizard.step() {
        OnboardingStep::Sex => format!(
            "[{}] (current: {})",
            Sex::choices(),
            draft.sex.map(|s| s.to_string()).unwrap_or_else(|| "unset".into())
        ),
        OnboardingStep::DateOfBirth => format!("YYYY-MM-DD (current: {})", draft.dob),
        OnboardingStep::Units => format!("[{}] (current: {})", UnitPref::choices(), draft.unit_pref),
        OnboardingStep::BodyStats => {
            let (height, weight) = draft.body_stat_labels();
            format!("<{height}> <{weight}>, '-' to skip one")
        }
        OnboardingStep::FitnessLevel => {
            format!("[{}] (current: {})", FitnessLevel::choices(), draft.fitness_level)
        }
        OnboardingStep::ActivityLevel => {
            format!("[{}] (current: {})", ActivityLevel::choices(), draft.activity_level)
        }
        OnboardingStep::Timezone => format!("(current: {})", draft.timezone),
        OnboardingStep::Review => "Press Enter to save".to_string(),
    }
}

async fn onboard(client: &ApiClient) -> anyhow::Result<()> {
    let mut wizard = OnboardingWizard::default();
    let mut input = stdin_lines();
    println!("Answer each question; a blank line keeps the shown value, 'back' returns to the previous step.\n");

    loop {
        let step = wizard.step();
        println!("{}  {}", wizard.position(), step.title());
        println!("{}", step.prompt());
        if step.is_last() {
            for (label, value) in wizard.review_rows() {
                println!("  {label:>8}: {value}");
            }
        }
        println!("{}", step_hint(&wizard));
        prompt(&format!("{}> ", wizard.action_label())).await?;

        let Some(line) = input.next_line().await? else {
            bail!("Onboarding aborted");
        };
        if line.trim().eq_ignore_ascii_case("back") {
            wizard.back();
            continue;
        }
        if let Err(e) = wizard.draft_mut().apply_input(step, &line) {
            println!("{e}\n");
            continue;
        }

        match wizard.next(client).await {
            WizardOutcome::Advanced(_) => println!(),
            WizardOutcome::Completed(profile) => {
                println!("\nProfile saved.");
                print_profile(&profile);
                return Ok(());
            }
            WizardOutcome::Failed(error) => println!("Could not save: {error}\n"),
        }
    }
}
