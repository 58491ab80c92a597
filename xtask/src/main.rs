// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Automation for the CaseTrack workspace, run as `cargo xtask <command>`.
//!
//! - `ci` runs `lint`, `machete`, `build`, `test`, and `verify-migrations`
//!   in that order and stops at the first failure
//! - `lint` is clippy with warnings denied, rustdoc with warnings denied for
//!   every `casetrack*` crate, and a rustfmt check
//! - `test` runs unit, integration, and doc tests, for the whole workspace or
//!   one package
//! - `verify-migrations` applies the persistence crate's embedded `SQLite`
//!   migrations to an in-memory database, checks the resulting tables
//!   against the columns the persistence layer maps, reverts everything,
//!   and applies them again
//!
//! Nothing here needs a running database server.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::BTreeSet;

use cargo_metadata::{Metadata, MetadataCommand};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::sql_types::Text;
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::{Expression, cmd};
use tracing_log::AsTrace;

/// Prefix shared by every library and binary crate of the workspace.
const CRATE_PREFIX: &str = "casetrack";

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the persistence layer reads and writes, with the columns it maps.
const EXPECTED_TABLES: &[(&str, &[&str])] = &[
    (
        "cases",
        &[
            "case_id",
            "case_number",
            "version",
            "current_stage",
            "status",
            "attempt_number",
            "client_id",
            "site_id",
            "contact_id",
            "assigned_to",
            "created_by",
            "case_type",
            "priority",
            "description",
            "investigation_report",
            "investigation_checklist",
            "root_cause",
            "solution_description",
            "solution_checklist",
            "planned_execution_date",
            "cost_required",
            "estimated_cost",
            "cost_description",
            "cost_status",
            "execution_report",
            "execution_checklist",
            "client_signature",
            "client_feedback",
            "client_rating",
            "cs_notes",
            "final_feedback",
            "final_rating",
            "final_cost",
            "final_cost_status",
            "final_cost_approved_by",
            "next_attachment_id",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "case_attachments",
        &[
            "case_id",
            "attachment_id",
            "filename",
            "url",
            "stage",
            "attachment_type",
            "uploaded_by",
        ],
    ),
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.log_level_filter().as_trace())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Task,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Clone, Debug, Subcommand)]
enum Task {
    /// Lint, check dependencies, build, test, and verify migrations
    Ci,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Type-check every target
    #[command(visible_alias = "c")]
    Check,

    /// Clippy, rustdoc, and rustfmt checks
    #[command(visible_alias = "l")]
    Lint,

    /// Apply clippy suggestions and rustfmt
    #[command(visible_alias = "f")]
    Fix,

    /// Report dependencies no crate uses
    #[command(visible_alias = "m")]
    Machete,

    /// Run unit, integration, and doc tests
    #[command(visible_alias = "t")]
    Test {
        /// Only test this package, e.g. `casetrack-api`
        #[arg(short, long)]
        package: Option<String>,
    },

    /// Apply, revert, and re-apply the `SQLite` migrations in memory
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Task {
    fn run(self) -> Result<()> {
        match self {
            Self::Ci => {
                for task in [
                    Self::Lint,
                    Self::Machete,
                    Self::Build,
                    Self::Test { package: None },
                    Self::VerifyMigrations,
                ] {
                    tracing::info!(?task, "ci step");
                    task.run()?;
                }
                Ok(())
            }
            Self::VerifyMigrations => verify_migrations(),
            other => {
                for step in other.steps()? {
                    run_step(&step)?;
                }
                Ok(())
            }
        }
    }

    /// The external commands a task runs, in order.
    fn steps(&self) -> Result<Vec<Expression>> {
        let steps: Vec<Expression> = match self {
            Self::Build => vec![cargo(&["build", "--workspace", "--all-targets"])],
            Self::Check => vec![cargo(&["check", "--workspace", "--all-targets"])],
            Self::Lint => {
                let mut steps: Vec<Expression> = vec![cargo(&[
                    "clippy",
                    "--workspace",
                    "--all-targets",
                    "--",
                    "-D",
                    "warnings",
                ])];
                steps.extend(doc_steps()?);
                steps.push(cargo(&["fmt", "--all", "--check"]));
                steps
            }
            Self::Fix => vec![
                cargo(&[
                    "clippy",
                    "--workspace",
                    "--all-targets",
                    "--fix",
                    "--allow-dirty",
                    "--allow-staged",
                ]),
                cargo(&["fmt", "--all"]),
            ],
            Self::Machete => vec![cmd!("cargo-machete")],
            Self::Test { package } => {
                let scope: Vec<&str> = package
                    .as_deref()
                    .map_or_else(|| vec!["--workspace"], |name| vec!["--package", name]);
                let mut unit: Vec<&str> = vec!["test", "--all-targets"];
                unit.extend(&scope);
                let mut doc: Vec<&str> = vec!["test", "--doc"];
                doc.extend(&scope);
                vec![cargo(&unit), cargo(&doc)]
            }
            Self::Ci | Self::VerifyMigrations => Vec::new(),
        };
        Ok(steps)
    }
}

fn cargo(args: &[&str]) -> Expression {
    cmd("cargo", args.iter().copied())
}

/// One rustdoc run per workspace crate, failing on any warning.
fn doc_steps() -> Result<Vec<Expression>> {
    let meta: Metadata = MetadataCommand::new()
        .exec()
        .wrap_err("failed to read cargo metadata")?;

    Ok(meta
        .workspace_packages()
        .into_iter()
        .filter(|package| package.name.starts_with(CRATE_PREFIX))
        .map(|package| {
            cargo(&["doc", "--no-deps", "--package", package.name.as_str()])
                .env("RUSTDOCFLAGS", "-D warnings")
        })
        .collect())
}

/// Runs a command, echoing it first and again if it fails.
fn run_step(step: &Expression) -> Result<()> {
    tracing::info!("running {step:?}");
    step.run()
        .map(drop)
        .wrap_err_with(|| format!("command failed: {step:?}"))
}

/// Verify the `SQLite` migrations against an in-memory database
///
/// Applies every embedded migration, compares the resulting tables with
/// [`EXPECTED_TABLES`], reverts all migrations (which must leave no user
/// tables behind), and applies them once more so `down.sql` and `up.sql`
/// stay in step.
fn verify_migrations() -> Result<()> {
    tracing::info!("Verifying SQLite migrations");

    let mut conn: SqliteConnection = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    check_schema(&mut conn)?;
    tracing::info!("Migrations applied and schema matches");

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let leftover: BTreeSet<String> = user_tables(&mut conn)?;
    if !leftover.is_empty() {
        return Err(eyre!("Tables left after reverting migrations: {leftover:?}"));
    }
    tracing::info!("Migrations reverted cleanly");

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;
    check_schema(&mut conn)?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tables created by the migrations, excluding `SQLite` and diesel bookkeeping
fn user_tables(conn: &mut SqliteConnection) -> Result<BTreeSet<String>> {
    let rows: Vec<NameRow> = diesel::sql_query(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' \
         AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations'",
    )
    .load(conn)
    .wrap_err("Failed to list SQLite tables")?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

fn table_columns(conn: &mut SqliteConnection, table: &str) -> Result<BTreeSet<String>> {
    let rows: Vec<NameRow> =
        diesel::sql_query(format!("SELECT name FROM pragma_table_info('{table}')"))
            .load(conn)
            .wrap_err_with(|| format!("Failed to read columns of {table}"))?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

fn check_schema(conn: &mut SqliteConnection) -> Result<()> {
    let tables: BTreeSet<String> = user_tables(conn)?;
    let expected: BTreeSet<String> = EXPECTED_TABLES
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect();

    if tables != expected {
        return Err(eyre!(
            "Table mismatch: expected {expected:?}, found {tables:?}"
        ));
    }

    let mut mismatches: Vec<String> = Vec::new();
    for (table, columns) in EXPECTED_TABLES {
        let found: BTreeSet<String> = table_columns(conn, table)?;
        let wanted: BTreeSet<String> = columns.iter().map(|c| (*c).to_string()).collect();

        for missing in wanted.difference(&found) {
            mismatches.push(format!("{table}.{missing} is missing"));
        }
        for extra in found.difference(&wanted) {
            mismatches.push(format!("{table}.{extra} is not mapped"));
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        for mismatch in &mismatches {
            tracing::error!("{mismatch}");
        }
        Err(eyre!("Schema has {} column mismatch(es)", mismatches.len()))
    }
}
