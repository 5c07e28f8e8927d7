//! Cadastro CLI - Pessoa física registry from the terminal
//!
//! List, search, edit and export the registry without the web front-end.

mod config;
mod notifier;
mod view;

use anyhow::{bail, Context, Result};
use cadastro::application::{FIELD_CPF, FIELD_NAME};
use cadastro::{
    should_offer_report, CadastroClient, DomainError, FileReportLocationStore, FormController,
    ListController, PersonForm, PessoaApi, PostalCodeLookup, QueryState, ReportState,
    ReportWorkflow, SubmitOutcome, ViaCepLookup,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use config::Config;
use notifier::TerminalNotifier;

#[derive(Parser)]
#[command(name = "cadastro")]
#[command(about = "Cadastro CLI - Pessoa física registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Show progress logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records, optionally filtered by name
    List {
        /// Name to search for
        #[arg(short, long)]
        busca: Option<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        pagina: u32,
        /// Query string such as "busca=Ana&pagina=2" (overrides --busca/--pagina)
        #[arg(long)]
        query: Option<String>,
    },

    /// Interactive listing: type to search, page and delete
    Browse,

    /// Show one record
    Show { id: i64 },

    /// Register a new record
    Create {
        #[command(flatten)]
        fields: PersonArgs,
    },

    /// Edit an existing record
    Edit {
        id: i64,
        #[command(flatten)]
        fields: PersonArgs,
    },

    /// Delete a record
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Look up an address by postal code
    Cep { code: String },

    /// CSV report of all records
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args, Debug, Default)]
struct PersonArgs {
    #[arg(long)]
    nome: Option<String>,
    #[arg(long)]
    cpf: Option<String>,
    #[arg(long)]
    telefone: Option<String>,
    /// Postal code; fills street, complement, neighborhood, city and state
    #[arg(long)]
    cep: Option<String>,
    #[arg(long)]
    rua: Option<String>,
    #[arg(long)]
    numero: Option<String>,
    #[arg(long)]
    complemento: Option<String>,
    #[arg(long)]
    bairro: Option<String>,
    #[arg(long)]
    municipio: Option<String>,
    #[arg(long)]
    estado: Option<String>,
}

impl PersonArgs {
    /// Copy the given flags into the form
    fn apply(&self, form: &mut PersonForm) {
        let set = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                *target = v.clone();
            }
        };

        set(&mut form.name, &self.nome);
        set(&mut form.cpf, &self.cpf);
        set(&mut form.phone, &self.telefone);
        set(&mut form.postal_code, &self.cep);
        set(&mut form.street, &self.rua);
        set(&mut form.number, &self.numero);
        set(&mut form.complement, &self.complemento);
        set(&mut form.neighborhood, &self.bairro);
        set(&mut form.city, &self.municipio);
        set(&mut form.state, &self.estado);
    }
}

#[derive(Subcommand)]
enum ReportAction {
    /// Request a new report and wait until it is ready
    Generate,
    /// Show the last generated report
    Status,
    /// Download the last generated report
    Download {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Forget the last generated report
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the registry API base URL
    SetUrl { url: String },
    /// Set the number of rows per page
    SetPageSize { size: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::List { busca, pagina, query } => cmd_list(busca, pagina, query).await,
        Commands::Browse => cmd_browse().await,
        Commands::Show { id } => cmd_show(id).await,
        Commands::Create { fields } => cmd_save(None, fields).await,
        Commands::Edit { id, fields } => cmd_save(Some(id), fields).await,
        Commands::Delete { id, yes } => cmd_delete(id, yes).await,
        Commands::Cep { code } => cmd_cep(code).await,
        Commands::Report { action } => cmd_report(action).await,
        Commands::Config { action } => cmd_config(action.unwrap_or(ConfigAction::Show)),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn api_client(config: &Config) -> Result<Arc<CadastroClient>> {
    let client = CadastroClient::from_config(&config.client_config())
        .context("Failed to create API client")?;
    Ok(Arc::new(client))
}

fn report_workflow(config: &Config) -> Result<ReportWorkflow<CadastroClient>> {
    let store = Arc::new(FileReportLocationStore::new(Config::report_store_path()?));
    Ok(ReportWorkflow::new(
        api_client(config)?,
        store,
        config.client_config().poll,
    ))
}

/// Wait for the in-flight listing query to settle
async fn settled(list: &ListController<CadastroClient>) -> Result<()> {
    let mut rx = list.subscribe();
    rx.wait_for(|s| !s.loading)
        .await
        .context("Listing stopped unexpectedly")?;
    Ok(())
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_list(busca: Option<String>, pagina: u32, query: Option<String>) -> Result<()> {
    let config = Config::load()?;
    // One query per invocation, nothing to debounce
    let client_config = config.client_config().with_debounce(Duration::ZERO);
    let notifier = Arc::new(TerminalNotifier::new(false));
    let list = ListController::new(api_client(&config)?, notifier, &client_config);

    match query {
        Some(qs) => list.navigate_to(&qs),
        None => list.navigate(QueryState::new(busca.unwrap_or_default(), pagina)),
    }
    settled(&list).await?;

    let state = list.state();
    view::print_listing(&state, list.pagination());
    if state.last_error.is_some() {
        bail!("Could not list records");
    }
    Ok(())
}

async fn cmd_browse() -> Result<()> {
    let config = Config::load()?;
    let client_config = config.client_config();
    let notifier = Arc::new(TerminalNotifier::new(false));
    let api = api_client(&config)?;
    let list = ListController::new(api, notifier, &client_config);

    list.refresh();
    settled(&list).await?;

    loop {
        let state = list.state();
        println!();
        view::print_listing(&state, list.pagination());

        let mut hint = ":n próxima  :p anterior  :d <id> apagar  :q sair".to_string();
        if should_offer_report(state.rows.len()) {
            hint.push_str("  :r relatório");
        }
        println!("{}", hint.dimmed());

        let line: String = Input::new()
            .with_prompt("Busca")
            .with_initial_text(state.query.search.clone())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        let page = state.query.page;
        let pagination = list.pagination();
        match line.trim() {
            ":q" => break,
            ":n" => {
                if pagination.is_some_and(|p| p.has_next()) {
                    list.set_page(page + 1);
                }
            }
            ":p" => {
                if pagination.is_some_and(|p| p.has_previous()) {
                    list.set_page(page - 1);
                }
            }
            ":r" => generate_report(&config).await?,
            cmd if cmd.starts_with(":d") => match cmd[2..].trim().parse::<i64>() {
                // Failures were already reported by the notifier
                Ok(id) => {
                    let _ = list.remove(id).await;
                }
                Err(_) => eprintln!("{}", "Uso: :d <id>".yellow()),
            },
            search => list.set_search(search),
        }
        settled(&list).await?;
    }

    Ok(())
}

async fn cmd_show(id: i64) -> Result<()> {
    let config = Config::load()?;
    let api = api_client(&config)?;

    match api.get(id).await {
        Ok(record) => view::print_record(&record),
        Err(DomainError::NotFound { .. }) => bail!("Registro {} não encontrado", id),
        Err(e) => return Err(e).context("Failed to fetch record"),
    }

    Ok(())
}

async fn cmd_save(id: Option<i64>, fields: PersonArgs) -> Result<()> {
    let config = Config::load()?;
    let api = api_client(&config)?;
    let lookup = ViaCepLookup::new(&config.postal_lookup_url);

    let (mut form_ctl, mut form) = match id {
        Some(id) => FormController::load(api, id)
            .await
            .with_context(|| format!("Failed to load record {}", id))?,
        None => (FormController::for_new(api), PersonForm::default()),
    };

    if let Some(cep) = &fields.cep {
        form.postal_code = cep.clone();
        match form_ctl.autofill_address(&lookup, &mut form).await {
            Ok(()) => println!("{} Endereço preenchido pelo CEP", "✓".green()),
            Err(e) => eprintln!("{} {}", "!".yellow(), e.user_message().yellow()),
        }
    }
    // Explicit flags win over the looked-up address
    fields.apply(&mut form);

    let interactive = std::io::stdin().is_terminal();
    if interactive && form_ctl.is_new() {
        if form.name.trim().is_empty() {
            form.name = prompt("Nome")?;
        }
        if form.cpf.trim().is_empty() {
            form.cpf = prompt("CPF")?;
        }
    }

    let outcome = loop {
        match form_ctl.submit(&form).await {
            Ok(outcome) => break outcome,
            Err(DomainError::InvalidFields(errors)) => {
                view::print_validation_errors(&errors);
                if !interactive {
                    bail!("Invalid record");
                }
                if errors.get(FIELD_NAME).is_some() {
                    form.name = prompt("Nome")?;
                    form_ctl.edit_field(FIELD_NAME);
                }
                if errors.get(FIELD_CPF).is_some() {
                    form.cpf = prompt("CPF")?;
                    form_ctl.edit_field(FIELD_CPF);
                }
            }
            Err(e) => bail!("{}", e.user_message()),
        }
    };

    let verb = match outcome {
        SubmitOutcome::Created(_) => "criado",
        SubmitOutcome::Updated(_) => "atualizado",
    };
    println!("{} Registro #{} {}", "✓".green(), outcome.id(), verb);

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .context("Failed to read input")
}

async fn cmd_delete(id: i64, yes: bool) -> Result<()> {
    let config = Config::load()?;
    let notifier = Arc::new(TerminalNotifier::new(yes));
    let list = ListController::new(api_client(&config)?, notifier, &config.client_config());

    // Success and failure are reported through the notifier
    match list.remove(id).await {
        Ok(true) => Ok(()),
        Ok(false) => bail!("Registro {} não foi apagado", id),
        Err(_) => bail!("Failed to delete record {}", id),
    }
}

async fn cmd_cep(code: String) -> Result<()> {
    let config = Config::load()?;
    let lookup = ViaCepLookup::new(&config.postal_lookup_url);

    let address = lookup
        .lookup(&code)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("{}", address.postal_code.cyan().bold());
    println!("  {} {}", "Rua".dimmed(), address.street);
    if !address.complement.is_empty() {
        println!("  {} {}", "Complemento".dimmed(), address.complement);
    }
    println!("  {} {}", "Bairro".dimmed(), address.neighborhood);
    println!("  {} {} - {}", "Município".dimmed(), address.city, address.state);

    Ok(())
}

async fn cmd_report(action: ReportAction) -> Result<()> {
    let config = Config::load()?;

    match action {
        ReportAction::Generate => generate_report(&config).await?,

        ReportAction::Status => {
            let workflow = report_workflow(&config)?;
            println!("{}", view::report_status_line(&workflow.state()));
        }

        ReportAction::Download { output } => {
            let workflow = report_workflow(&config)?;
            let Some(bytes) = workflow.download().await.context("Failed to download report")?
            else {
                println!("{}", view::report_status_line(&ReportState::Idle));
                return Ok(());
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("Failed to write report to {:?}", path))?;
                    println!("{} Relatório salvo em {:?}", "✓".green(), path);
                }
                None => std::io::stdout()
                    .write_all(&bytes)
                    .context("Failed to write report")?,
            }
        }

        ReportAction::Clear => {
            report_workflow(&config)?.clear()?;
            println!("{} Relatório descartado", "✓".green());
        }
    }

    Ok(())
}

async fn generate_report(config: &Config) -> Result<()> {
    let workflow = report_workflow(config)?;
    let job_id = workflow
        .generate()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{} (#{})", view::report_status_line(&workflow.state()), job_id);

    let location = workflow
        .wait_until_ready()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("{} {}", "✓".green(), view::report_status_line(&ReportState::Ready { location }));
    println!("  {}", "cadastro report download -o relatorio.csv".dimmed());
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => {
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Base URL: {}", config.base_url.cyan());
            println!("  Postal lookup: {}", config.postal_lookup_url);
            println!("  Page size: {}", config.page_size);
            println!("  Debounce: {}ms", config.debounce_ms);
            println!("  Report location file: {:?}", Config::report_store_path()?);
        }
        ConfigAction::SetUrl { url } => {
            config.base_url = url;
            config.save()?;
            println!("{} Base URL set to {}", "✓".green(), config.base_url);
        }
        ConfigAction::SetPageSize { size } => {
            if size == 0 {
                bail!("Page size must be at least 1");
            }
            config.page_size = size;
            config.save()?;
            println!("{} Page size set to {}", "✓".green(), size);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_args_only_override_given_fields() {
        let mut form = PersonForm {
            name: "Ana".to_string(),
            street: "Avenida Paulista".to_string(),
            ..Default::default()
        };
        let args = PersonArgs {
            numero: Some("1578".to_string()),
            rua: Some("Rua Augusta".to_string()),
            ..Default::default()
        };

        args.apply(&mut form);

        assert_eq!(form.name, "Ana");
        assert_eq!(form.street, "Rua Augusta");
        assert_eq!(form.number, "1578");
    }

    #[test]
    fn test_cli_parses_list_flags() {
        let cli = Cli::parse_from(["cadastro", "list", "--busca", "Ana", "--pagina", "2"]);
        match cli.command {
            Commands::List { busca, pagina, query } => {
                assert_eq!(busca.as_deref(), Some("Ana"));
                assert_eq!(pagina, 2);
                assert!(query.is_none());
            }
            _ => panic!("Expected list command"),
        }
    }

    #[test]
    fn test_cli_parses_edit_with_cep() {
        let cli = Cli::parse_from(["cadastro", "-v", "edit", "7", "--cep", "01310-100"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Edit { id, fields } => {
                assert_eq!(id, 7);
                assert_eq!(fields.cep.as_deref(), Some("01310-100"));
            }
            _ => panic!("Expected edit command"),
        }
    }
}
