use clap::Parser;

use todoboard_infra::{db, migrate::Migrator};
use todoboard_seed::inputs::{Children, Parent, TodoInputs};
use todoboard_seed::{Plan, PlanOptions, SeedClient, Store};

/// Fill a todo board database with deterministic sample data.
#[derive(Debug, Parser)]
#[command(name = "todoboard-seed", version, about)]
struct Args {
    /// Users to create.
    #[arg(long, default_value_t = 5)]
    users: usize,

    /// Todos authored by each user.
    #[arg(long, default_value_t = 3)]
    todos_per_user: usize,

    /// Votes cast on each todo.
    #[arg(long, default_value_t = 2)]
    votes_per_todo: usize,

    /// Seed for value generation; the same seed yields the same rows.
    #[arg(long, env = "SEED", default_value = todoboard_seed::plan::DEFAULT_SEED)]
    seed: String,

    /// Print the SQL instead of executing it.
    #[arg(long)]
    dry_run: bool,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

/// Creates `users` users, then `todos_per_user` todos for each of them.
/// Voters are connected round-robin to any user in the store, including
/// rows that already exist in the database.
fn plan(args: &Args) -> anyhow::Result<Plan> {
    let users = args.users;
    let per_user = args.todos_per_user;
    let votes = args.votes_per_todo;
    let todos = users
        .checked_mul(per_user)
        .ok_or_else(|| anyhow::anyhow!("--users times --todos-per-user is too large"))?;

    Ok(Plan::pipe([
        Plan::users(Children::x(users)),
        Plan::todos(Children::x_with(todos, move |_| TodoInputs {
            // The users created above are the last `users` rows of the store.
            user: Some(Parent::connect(move |ctx| {
                let first = ctx.store.user.len().checked_sub(users)?;
                ctx.store.user.get(first + ctx.index / per_user).map(|u| u.id)
            })),
            votes: Some(Children::x(votes)),
            ..Default::default()
        })),
    ])
    .with_options(PlanOptions::seeded(args.seed.clone()).auto_connect(true)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    todoboard_observability::init();
    let args = Args::parse();
    let plan = plan(&args)?;

    if args.dry_run {
        let store = plan.generate(&Store::new())?;
        for statement in store.to_sql() {
            println!("{statement};");
        }
        return Ok(());
    }

    let url = args
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set unless --dry-run is given"))?;

    let pool = db::connect(url, args.max_connections).await?;
    let report = Migrator::default().run(&pool).await?;
    tracing::info!(applied = ?report.applied, "schema ready");

    let store = SeedClient::new(pool).run(&plan).await?;
    tracing::info!(
        users = store.pending(todoboard_seed::Table::User),
        todos = store.pending(todoboard_seed::Table::Todo),
        votes = store.pending(todoboard_seed::Table::Vote),
        "seed complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["todoboard-seed", "--dry-run"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn todos_go_only_to_the_users_this_run_creates() {
        let existing = Plan::users(Children::x(2)).generate(&Store::new()).unwrap();
        let initial = Store::external(existing);

        let plan = plan(&args(&["--users", "2", "--todos-per-user", "3", "--votes-per-todo", "1"])).unwrap();
        let store = plan.generate(&initial).unwrap();

        assert_eq!(store.user.len(), 4);
        let authors: Vec<i32> = store.todo.iter().map(|t| t.created_by_id).collect();
        assert_eq!(authors, vec![3, 3, 3, 4, 4, 4]);
        assert_eq!(store.vote.len(), 6);
    }

    #[test]
    fn oversized_todo_count_is_rejected() {
        let max = usize::MAX.to_string();
        assert!(plan(&args(&["--users", max.as_str(), "--todos-per-user", "2"])).is_err());
    }
}
