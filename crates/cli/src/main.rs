use anyhow::Context;
use clap::{Parser, Subcommand};
use cmvr_core::conditions::{ConditionPatch, DescriptionsPatch, Label, TemplateStore};
use cmvr_core::constants::DEFAULT_DRAFTS_DIR;
use cmvr_core::{
    list_drafts, resolve_template_file, ChecklistService, ComplianceStatus, ConditionId,
    CoreConfig, FileDraftStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cmvr")]
#[command(about = "ECC condition checklist for CMVR compliance reports")]
struct Cli {
    /// Condition template file (YAML); overrides CMVR_TEMPLATE_FILE
    #[arg(long, global = true)]
    template: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new report draft
    New,
    /// List all drafts
    List,
    /// Show the labelled checklist of a draft
    Show {
        /// Draft UUID
        draft: String,
    },
    /// Add a custom condition
    Add {
        /// Draft UUID
        draft: String,
        /// Nest the new condition under this divider id
        #[arg(long)]
        parent: Option<String>,
    },
    /// Edit a condition's title or status descriptions
    Edit {
        /// Draft UUID
        draft: String,
        /// Condition id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        complied: Option<String>,
        #[arg(long)]
        partially_complied: Option<String>,
        #[arg(long)]
        not_complied: Option<String>,
    },
    /// Discard the edits made to a default condition
    Reset {
        /// Draft UUID
        draft: String,
        /// Condition id
        id: String,
    },
    /// Hide a default condition for this draft
    Hide {
        /// Draft UUID
        draft: String,
        /// Condition id
        id: String,
    },
    /// Permanently delete a custom condition
    Delete {
        /// Draft UUID
        draft: String,
        /// Condition id
        id: String,
    },
    /// Bring back all hidden default conditions
    Restore {
        /// Draft UUID
        draft: String,
    },
    /// Record the compliance status of a condition
    Select {
        /// Draft UUID
        draft: String,
        /// Condition id
        id: String,
        /// complied, partially-complied, not-complied or none
        status: String,
    },
    /// Record a remark for a condition
    Remark {
        /// Draft UUID
        draft: String,
        /// Condition id
        id: String,
        /// Remark text; omit with --canned
        text: Option<String>,
        /// Use the description matching the current status as the remark
        #[arg(long, conflicts_with = "text")]
        canned: bool,
    },
    /// Print the report output of a draft as JSON
    Export {
        /// Draft UUID
        draft: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("cmvr=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let drafts_dir = std::env::var("CMVR_DRAFTS_DIR").unwrap_or_else(|_| DEFAULT_DRAFTS_DIR.into());
    let template_file = resolve_template_file(
        cli.template
            .or_else(|| std::env::var_os("CMVR_TEMPLATE_FILE").map(PathBuf::from)),
    )?;
    let cfg = Arc::new(CoreConfig::new(PathBuf::from(drafts_dir), template_file)?);

    let Some(command) = cli.command else {
        println!("Use 'cmvr --help' for commands");
        return Ok(());
    };

    match command {
        Commands::New => {
            let store = FileDraftStore::create(&cfg)?;
            println!("Created draft: {}", store.draft_id());
        }
        Commands::List => {
            let drafts = list_drafts(cfg.drafts_dir());
            if drafts.is_empty() {
                println!("No drafts found.");
            } else {
                for draft in drafts {
                    println!("{}", draft);
                }
            }
        }
        Commands::Show { draft } => {
            let service = mount(&cfg, &draft)?;
            for row in service.rows() {
                let status = row.selection.map(|s| s.as_str()).unwrap_or("-");
                match row.label {
                    Label::Divider => println!("\n{}", row.item.title),
                    Label::Nested(_) => println!(
                        "    {:<6} {} [{}] ({})",
                        row.label.to_string(),
                        row.item.title,
                        status,
                        row.item.id
                    ),
                    Label::Number(_) => println!(
                        "{:<6} {} [{}] ({})",
                        row.label.to_string(),
                        row.item.title,
                        status,
                        row.item.id
                    ),
                }
                if !row.remark.is_empty() {
                    println!("       remark: {}", row.remark);
                }
            }
        }
        Commands::Add { draft, parent } => {
            let mut service = mount(&cfg, &draft)?;
            let id = match parent {
                Some(parent) => service.add_child_item(&parent)?,
                None => service.add_item()?,
            };
            println!("Added condition: {}", id);
        }
        Commands::Edit {
            draft,
            id,
            title,
            complied,
            partially_complied,
            not_complied,
        } => {
            let patch = ConditionPatch {
                title,
                descriptions: DescriptionsPatch {
                    complied_text: complied,
                    partially_complied_text: partially_complied,
                    not_complied_text: not_complied,
                },
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to edit; pass --title or a description flag");
            }
            let mut service = mount(&cfg, &draft)?;
            service.edit_item(&id, patch)?;
            println!("Updated condition: {}", id);
        }
        Commands::Reset { draft, id } => {
            let mut service = mount(&cfg, &draft)?;
            if service.reset_item(&id)? {
                println!("Reset condition: {}", id);
            } else {
                println!("Condition {} has no edits", id);
            }
        }
        Commands::Hide { draft, id } => {
            let mut service = mount(&cfg, &draft)?;
            let removal = service.hide_default(&id)?;
            println!("Hid condition: {}", removal.id);
            if let Some(divider) = removal.cascaded_divider {
                println!("Hid divider: {}", divider);
            }
        }
        Commands::Delete { draft, id } => {
            let mut service = mount(&cfg, &draft)?;
            let removal = service.delete_custom(&id)?;
            println!("Deleted condition: {}", removal.id);
            if let Some(divider) = removal.cascaded_divider {
                println!("Hid divider: {}", divider);
            }
        }
        Commands::Restore { draft } => {
            let mut service = mount(&cfg, &draft)?;
            service.restore_defaults();
            println!("Restored default conditions");
        }
        Commands::Select { draft, id, status } => {
            let status = match status.as_str() {
                "none" | "" => None,
                other => Some(other.parse::<ComplianceStatus>()?),
            };
            let mut service = mount(&cfg, &draft)?;
            service.set_selection(ConditionId::new(&id)?, status);
            println!("Updated status of condition: {}", id);
        }
        Commands::Remark {
            draft,
            id,
            text,
            canned,
        } => {
            let mut service = mount(&cfg, &draft)?;
            if canned {
                match service.apply_canned_remark(&id)? {
                    Some(text) => println!("Remark: {}", text),
                    None => println!("Condition {} has no status selected", id),
                }
            } else {
                service.set_remark(ConditionId::new(&id)?, text.unwrap_or_default());
                println!("Updated remark of condition: {}", id);
            }
        }
        Commands::Export { draft } => {
            let service = mount(&cfg, &draft)?;
            println!("{}", serde_json::to_string_pretty(&service.export())?);
        }
    }

    Ok(())
}

fn mount(cfg: &CoreConfig, draft: &str) -> anyhow::Result<ChecklistService<FileDraftStore>> {
    let templates: TemplateStore = cfg.load_templates()?;
    let store = FileDraftStore::open(cfg, draft).with_context(|| format!("draft {}", draft))?;
    tracing::debug!("opened draft {}", store.state_path().display());
    Ok(ChecklistService::mount(Arc::new(templates), store))
}
