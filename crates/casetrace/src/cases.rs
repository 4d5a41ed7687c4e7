// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `casetrace case` subcommands.

use clap::{Args, Subcommand};
use colored::Colorize;

use casetrace_core::{
    CasetraceError, Investigation, InvestigationId, InvestigationKind, InvestigationPatch,
    InvestigationStatus, NewInvestigation,
};
use casetrace_guard::{protected, RouteDecision};

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum CaseCommand {
    /// List your investigations, newest first.
    List,
    /// Open a new investigation.
    Create(CreateArgs),
    /// Show a single investigation.
    Open {
        /// Investigation id.
        id: String,
    },
    /// Update fields on an investigation.
    Set(SetArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Target kind: website, email, or document.
    #[arg(long)]
    pub kind: String,
    /// The URL, email address, or file descriptor under investigation.
    #[arg(long)]
    pub target: String,
    /// Short case title.
    #[arg(long)]
    pub title: String,
    /// Optional longer description.
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Investigation id.
    pub id: String,
    /// New status: pending, running, completed, or failed.
    #[arg(long)]
    pub status: Option<String>,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(long)]
    pub description: Option<String>,
    /// Risk score in [0, 100].
    #[arg(long)]
    pub risk_score: Option<u8>,
    /// Progress in [0, 100].
    #[arg(long)]
    pub progress: Option<u8>,
}

pub async fn run(app: &App, command: CaseCommand) -> Result<(), CasetraceError> {
    app.restore().await?;

    // All case commands require a signed-in user.
    match protected(&app.session.snapshot().await) {
        RouteDecision::Allow => {}
        _ => return Err(CasetraceError::NotAuthenticated),
    }

    match command {
        CaseCommand::List => list(app).await,
        CaseCommand::Create(args) => create(app, args).await,
        CaseCommand::Open { id } => open(app, &id).await,
        CaseCommand::Set(args) => set(app, args).await,
    }
}

async fn list(app: &App) -> Result<(), CasetraceError> {
    let store = app.investigations()?;
    store.refresh().await?;
    let records = store.records().await;
    if records.is_empty() {
        println!("No investigations yet. Open one with `casetrace case create`.");
        return Ok(());
    }
    for record in &records {
        println!("{}", summary_line(record));
    }
    Ok(())
}

async fn create(app: &App, args: CreateArgs) -> Result<(), CasetraceError> {
    let record = app
        .investigations()?
        .create(NewInvestigation {
            kind: parse_kind(&args.kind)?,
            target: args.target,
            title: args.title,
            description: args.description,
        })
        .await?;
    println!("Created {}", summary_line(&record));
    Ok(())
}

async fn open(app: &App, id: &str) -> Result<(), CasetraceError> {
    let record = app
        .investigations()?
        .open(&InvestigationId(id.to_string()))
        .await?;
    print_detail(&record);
    Ok(())
}

async fn set(app: &App, args: SetArgs) -> Result<(), CasetraceError> {
    let patch = InvestigationPatch {
        status: args.status.as_deref().map(parse_status).transpose()?,
        target: None,
        title: args.title,
        description: args.description,
        risk_score: args.risk_score,
        progress: args.progress,
    };
    if patch.is_empty() {
        return Err(CasetraceError::InvalidField(
            "nothing to update; pass at least one field".into(),
        ));
    }
    let record = app
        .investigations()?
        .update(&InvestigationId(args.id), patch)
        .await?;
    println!("Updated {}", summary_line(&record));
    Ok(())
}

fn parse_kind(value: &str) -> Result<InvestigationKind, CasetraceError> {
    value.parse().map_err(|_| {
        CasetraceError::InvalidField(format!(
            "unknown kind '{value}' (expected website, email, or document)"
        ))
    })
}

fn parse_status(value: &str) -> Result<InvestigationStatus, CasetraceError> {
    value.parse().map_err(|_| {
        CasetraceError::InvalidField(format!(
            "unknown status '{value}' (expected pending, running, completed, or failed)"
        ))
    })
}

fn colored_status(status: InvestigationStatus) -> String {
    let text = status.to_string();
    match status {
        InvestigationStatus::Pending => text.normal(),
        InvestigationStatus::Running => text.yellow(),
        InvestigationStatus::Completed => text.green(),
        InvestigationStatus::Failed => text.red(),
    }
    .to_string()
}

fn summary_line(record: &Investigation) -> String {
    let risk = record
        .risk_score
        .map(|score| format!("risk {score}"))
        .unwrap_or_else(|| "unscored".to_string());
    format!(
        "{}  [{:>9}]  {}  ({}, {})",
        record.id,
        colored_status(record.status),
        record.title,
        record.kind,
        risk
    )
}

fn print_detail(record: &Investigation) {
    println!("id:          {}", record.id);
    println!("title:       {}", record.title);
    println!("kind:        {}", record.kind);
    println!("status:      {}", colored_status(record.status));
    println!("target:      {}", record.target);
    if let Some(description) = &record.description {
        println!("description: {description}");
    }
    if let Some(score) = record.risk_score {
        println!("risk score:  {score}");
    }
    if let Some(progress) = record.progress {
        println!("progress:    {progress}%");
    }
    println!("created:     {}", record.created_at.to_rfc3339());
}
