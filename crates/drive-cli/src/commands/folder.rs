//! Folder inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use drive_core::config::AppConfig;
use drive_core::error::AppError;
use drive_core::types::FolderId;
use drive_entity::folder::FolderNode;

use super::UserArgs;
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List a user's folders under a parent
    List {
        /// Owner of the folders
        #[command(flatten)]
        who: UserArgs,
        /// Parent folder ID (omit for root level)
        #[arg(short, long)]
        parent: Option<FolderId>,
    },
    /// Show a user's folder tree
    Tree {
        /// Owner of the folders
        #[command(flatten)]
        who: UserArgs,
        /// Start from this folder instead of the root level
        #[arg(short, long)]
        root: Option<FolderId>,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Path
    path: String,
    /// Created at
    created_at: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, drive) = super::open_drive(config).await?;

    match &args.command {
        FolderCommand::List { who, parent } => {
            let folders = drive.list_children(&who.context(), *parent).await?;
            let rows: Vec<FolderRow> = folders
                .iter()
                .map(|f| FolderRow {
                    id: f.id.to_string(),
                    name: f.name.clone(),
                    path: f.path.clone(),
                    created_at: f.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        FolderCommand::Tree { who, root } => {
            let forest = drive.folder_tree(&who.context(), *root).await?;
            match format {
                OutputFormat::Json => output::print_json(&forest),
                OutputFormat::Table => {
                    println!("/");
                    for node in &forest {
                        print_node(node, 1);
                    }
                }
            }
        }
    }

    stores.close().await;
    Ok(())
}

fn print_node(node: &FolderNode, depth: usize) {
    println!(
        "{}├── {}/ ({} files)",
        "  ".repeat(depth),
        node.name,
        node.file_count
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
