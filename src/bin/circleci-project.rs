//! CircleCI project CLI binary.
//!
//! A command-line interface for managing CircleCI projects.

use std::path::Path;
use std::process::ExitCode;

use circleci_project::cli::{
    read_spec, read_state, record_apply, remove_state, write_state, AwsCommand, Cli, Command,
    EnvCommand,
};
use circleci_project::{
    mask_secret, plan, CircleCiClient, CircleCiError, EnvVar, PrettyPrint, Project, ProjectState,
    Reconciler,
};
use clap::Parser;
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, CircleCiError::ConfigMissing(_)) {
                eprintln!("Hint: Set CIRCLECI_API_TOKEN environment variable or pass --token");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn build_client(token: Option<&str>, api_url: &str, debug: bool) -> circleci_project::Result<CircleCiClient> {
    let token = token
        .ok_or_else(|| CircleCiError::ConfigMissing("API token not provided".to_string()))?;

    CircleCiClient::builder(token).base_url(api_url).debug(debug).build()
}

async fn run(cli: Cli) -> circleci_project::Result<()> {
    let Cli {
        json,
        debug,
        token,
        api_url,
        command,
    } = cli;
    let client = || build_client(token.as_deref(), &api_url, debug);

    match command {
        Command::Mask { value } => println!("{}", mask_secret(&value)),
        Command::Plan { config, state } => handle_plan(&config, state.as_deref(), json)?,
        Command::Projects => {
            let projects = client()?.list_projects().await?;
            output_list(&projects, json, |p| ProjectRow::from(p))?;
        }
        Command::Get { id } => {
            let project = client()?.get_project(&id).await?;
            output_single(&project, json)?;
        }
        Command::Follow { id } => {
            client()?.follow_project(&id).await?;
            eprintln!("Following {id}");
        }
        Command::Disable { id } => {
            client()?.disable_project(&id).await?;
            eprintln!("Disabled {id}");
        }
        Command::Env { command } => handle_env(&client()?, command, json).await?,
        Command::Aws { command } => match command {
            AwsCommand::Set {
                id,
                access_key_id,
                secret_access_key,
            } => {
                client()?
                    .set_aws_keys(&id, &access_key_id, &secret_access_key)
                    .await?;
                eprintln!("Configured AWS keys for {id}");
            }
            AwsCommand::Remove { id } => {
                client()?.remove_aws_keys(&id).await?;
                eprintln!("Removed AWS keys from {id}");
            }
        },
        Command::Apply { config, state } => {
            let spec = read_spec(&config)?;
            let prior = read_state(&state)?;
            let reconciler = Reconciler::new(client()?);
            let outcome = reconciler.apply(prior.as_ref(), &spec).await;
            let next = record_apply(&state, outcome)?;
            output_single(&next, json)?;
        }
        Command::Refresh { state } => {
            let prior = read_state(&state)?.ok_or_else(|| missing_state(&state))?;
            let reconciler = Reconciler::new(client()?);
            match reconciler.read(&prior.project_ref()).await? {
                Some(next) => {
                    write_state(&state, &next)?;
                    output_single(&next, json)?;
                }
                None => {
                    remove_state(&state)?;
                    eprintln!("Project {} no longer exists, state removed", prior.id);
                }
            }
        }
        Command::Import { id, state } => {
            let reconciler = Reconciler::new(client()?);
            let imported = reconciler.import(&id).await?;
            write_state(&state, &imported)?;
            output_single(&imported, json)?;
        }
        Command::Destroy { state } => {
            let prior = read_state(&state)?.ok_or_else(|| missing_state(&state))?;
            let reconciler = Reconciler::new(client()?);
            reconciler.delete(&prior.project_ref()).await?;
            remove_state(&state)?;
            eprintln!("Disabled {}", prior.id);
        }
    }
    Ok(())
}

fn handle_plan(config: &Path, state: Option<&Path>, json: bool) -> circleci_project::Result<()> {
    let spec = read_spec(config)?;
    let prior: Option<ProjectState> = match state {
        Some(path) => read_state(path)?,
        None => None,
    };
    let plan = plan(prior.as_ref(), &spec);
    output_single(&plan, json)
}

async fn handle_env(
    client: &CircleCiClient,
    command: EnvCommand,
    json: bool,
) -> circleci_project::Result<()> {
    match command {
        EnvCommand::List { id } => {
            let vars = client.list_env_vars(&id).await?;
            output_list(&vars, json, |v| EnvVarRow::from(v))?;
        }
        EnvCommand::Add { id, name, value } => {
            let var = client.add_env_var(&id, &name, &value).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&var)?);
            } else {
                println!("{} = {}", var.name, var.value);
            }
        }
        EnvCommand::Delete { id, name } => {
            client.delete_env_var(&id, &name).await?;
            eprintln!("Deleted {name} from {id}");
        }
    }
    Ok(())
}

fn missing_state(path: &Path) -> CircleCiError {
    CircleCiError::InvalidConfig(format!("no state file at {}", path.display()))
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> circleci_project::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> circleci_project::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct ProjectRow {
    id: String,
    #[tabled(rename = "aws key")]
    aws_key: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p
                .project_ref()
                .map(|r| r.id())
                .unwrap_or_else(|| format!("{}/{}/{}", p.vcs_type, p.username, p.reponame)),
            aws_key: p
                .aws_keypair()
                .map(|kp| kp.access_key_id.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct EnvVarRow {
    name: String,
    value: String,
}

impl From<&EnvVar> for EnvVarRow {
    fn from(v: &EnvVar) -> Self {
        Self {
            name: v.name.clone(),
            value: v.value.clone(),
        }
    }
}
