//! Text rendering of records, listings and reports

use cadastro::config::EMPTY_LISTING_MESSAGE;
use cadastro::{Cpf, ListState, Pagination, PersonRecord, ReportState, ValidationErrorSet};
use colored::Colorize;

/// One listing row: id, name and punctuated CPF
pub fn format_row(record: &PersonRecord) -> String {
    format!(
        "{:>6}  {:<32}  {}",
        record.id,
        truncate_string(record.name(), 32),
        Cpf::format(record.cpf())
    )
}

pub fn pagination_line(pagination: &Pagination) -> String {
    format!(
        "Página {} de {}",
        pagination.current_page, pagination.page_count
    )
}

pub fn print_listing(state: &ListState, pagination: Option<Pagination>) {
    if let Some(error) = &state.last_error {
        eprintln!("{} {}", "✗".red(), error.red());
    }

    if state.is_empty_listing() {
        println!("{}", EMPTY_LISTING_MESSAGE.dimmed());
        return;
    }

    if state.query.is_search() {
        println!("{} '{}'", "Busca:".bold(), state.query.search.cyan());
    }
    for row in &state.rows {
        println!("{}", format_row(row));
    }

    if let Some(p) = pagination {
        let mut hints = Vec::new();
        if p.has_previous() {
            hints.push(format!("--pagina {}", p.current_page - 1));
        }
        if p.has_next() {
            hints.push(format!("--pagina {}", p.current_page + 1));
        }
        println!("\n{}  {}", pagination_line(&p), hints.join("  ").dimmed());
    }
}

pub fn print_record(record: &PersonRecord) {
    let data = &record.data;
    let field = |label: &str, value: Option<&str>| {
        println!("  {:<12} {}", label.dimmed(), value.unwrap_or("-"));
    };

    println!("{} {}", format!("#{}", record.id).dimmed(), data.name.cyan().bold());
    field("CPF", Some(&Cpf::format(&data.cpf)));
    field("Telefone", data.phone.as_deref());
    field("CEP", data.postal_code.as_deref());
    field("Rua", data.street.as_deref());
    field("Número", data.number.as_deref());
    field("Complemento", data.complement.as_deref());
    field("Bairro", data.neighborhood.as_deref());
    field("Município", data.city.as_deref());
    field("Estado", data.state.as_deref());
}

pub fn print_validation_errors(errors: &ValidationErrorSet) {
    for (field, message) in errors.iter() {
        eprintln!("  {} {}: {}", "✗".red(), field.bold(), message);
    }
}

pub fn report_status_line(state: &ReportState) -> String {
    match state {
        ReportState::Idle => "Nenhum relatório gerado.".to_string(),
        ReportState::Generating { .. } => "Gerando relatório...".to_string(),
        ReportState::Ready { location } => format!("Relatório disponível: {location}"),
        ReportState::Failed { reason } => format!("Falha ao gerar relatório: {reason}"),
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadastro::PersonData;

    fn record(id: i64, name: &str, cpf: &str) -> PersonRecord {
        PersonRecord::new(
            id,
            PersonData {
                name: name.to_string(),
                cpf: cpf.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_format_row_punctuates_cpf() {
        let row = format_row(&record(3, "Ana", "12345678909"));
        assert!(row.contains("Ana"));
        assert!(row.ends_with("123.456.789-09"));
    }

    #[test]
    fn test_truncate_string_utf8() {
        assert_eq!(truncate_string("João", 10), "João");
        assert_eq!(truncate_string("Conceição Aparecida", 10), "Conceiç...");
    }

    #[test]
    fn test_pagination_line() {
        let p = Pagination::compute(10, 4, 2).unwrap();
        assert_eq!(pagination_line(&p), "Página 2 de 3");
    }

    #[test]
    fn test_report_status_line() {
        let ready = ReportState::Ready {
            location: "http://localhost:8080/relatorio-csv/pessoa-fisica/get-relatorio/1".to_string(),
        };
        assert!(report_status_line(&ready).ends_with("get-relatorio/1"));
        assert_eq!(report_status_line(&ReportState::Idle), "Nenhum relatório gerado.");
    }
}
