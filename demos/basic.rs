//! Basic example demonstrating the CircleCI project client.
//!
//! Run with:
//! ```
//! CIRCLECI_API_TOKEN=your-token cargo run --example basic -- github:acme:widgets
//! ```

use circleci_project::{plan, CircleCiClient, ProjectRef, ProjectSpec, Reconciler};

#[tokio::main]
async fn main() -> circleci_project::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating CircleCI client...");
    let client = CircleCiClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // List followed projects
    println!("\n--- Followed Projects ---");
    let projects = client.list_projects().await?;
    println!("Following {} projects", projects.len());

    for project in &projects {
        let aws = if project.aws_keypair().is_some() {
            "aws keys set"
        } else {
            "no aws keys"
        };
        println!(
            "  - {}/{}/{} ({})",
            project.vcs_type, project.username, project.reponame, aws
        );
    }

    // Inspect one project through the reconciler
    let Some(id) = std::env::args().nth(1) else {
        println!("\nPass a project id (vcs_type:account:project) to inspect it.");
        return Ok(());
    };
    let project: ProjectRef = id.parse()?;
    let reconciler = Reconciler::new(client);

    println!("\n--- Project State ---");
    let Some(state) = reconciler.read(&project).await? else {
        println!("{project} is not followed");
        return Ok(());
    };

    for var in &state.variable {
        println!("  {} = {}", var.name, var.value);
    }

    // Preview dropping every variable, without changing anything
    println!("\n--- Plan: remove all variables ---");
    let spec = ProjectSpec::new(project.vcs_type, &project.account, &project.reponame);
    let planned = plan(Some(&state), &spec);
    println!("Action: {:?}", planned.action);
    for name in &planned.variables.to_remove {
        println!("  - {name}");
    }

    println!("\nDone!");
    Ok(())
}
