//! Filter options and query commands.

use console::style;

use roadworks::query::{
    run_query, with_placeholder, FilterOptions, PeriodFilter, QueryCriteria, QueryResult,
    Selections, SELECT_PLACEHOLDER,
};

use super::output::{format_optional_timestamp, print_halt, render_table};
use super::Context;

const DETAIL_COLUMNS: [&str; 10] = [
    "Num Interv",
    "Rodovia",
    "KM Inicial",
    "KM Final",
    "Sentido",
    "Tipo",
    "Executor",
    "Inicio",
    "DataFim",
    "Base",
];

/// List selectable values for every filter.
pub async fn cmd_options(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.open_session().await;
    if let Some(reason) = session.halt_reason() {
        print_halt(&session, &reason);
        return Ok(());
    }

    let options = FilterOptions::from_rows(&session.enriched());
    let periods: Vec<String> = PeriodFilter::CHOICES.iter().map(|p| p.to_string()).collect();
    let fields = [
        ("Rodovia", with_placeholder(&options.rodovias)),
        ("Tipo (Serviço)", with_placeholder(&options.tipos)),
        ("Data (de Início)", with_placeholder(&options.date_labels())),
        ("Período", with_placeholder(&periods)),
        ("Sentido", with_placeholder(&options.sentidos)),
        ("Executor", with_placeholder(&options.executores)),
    ];

    for (label, values) in fields {
        println!("\n{}", style(label).bold());
        for value in &values {
            if value == SELECT_PLACEHOLDER {
                println!("  {}", style(value).dim());
            } else {
                println!("  {}", value);
            }
        }
    }
    Ok(())
}

/// Run a query and print ranked intervention numbers plus matching rows.
pub async fn cmd_query(ctx: &Context, selections: &Selections) -> anyhow::Result<()> {
    // Refuse before touching the snapshot or the network
    let criteria = QueryCriteria::from_selections(selections)?;

    let session = ctx.open_session().await;
    if let Some(reason) = session.halt_reason() {
        print_halt(&session, &reason);
        return Ok(());
    }

    let rows = session.enriched();
    let result = run_query(&rows, &criteria);
    if result.is_empty() {
        println!(
            "{} Nenhum registro encontrado para os filtros informados.",
            style("✗").red()
        );
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

fn print_result(result: &QueryResult<'_>) {
    println!("\n{}", style("Números de Programação encontrados").bold());
    for entry in &result.counts {
        if entry.count > 1 {
            println!(
                "  {}  {}",
                style(&entry.num_interv).bold(),
                style(format!("aparece {}×", entry.count)).dim()
            );
        } else {
            println!("  {}", style(&entry.num_interv).bold());
        }
    }

    let dash = || "-".to_string();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|r| {
            vec![
                r.row.num_interv.clone(),
                r.row.rodovia.clone(),
                r.km_inicial.clone().unwrap_or_else(dash),
                r.km_final.clone().unwrap_or_else(dash),
                r.row.sentido.clone(),
                r.row.tipo.clone(),
                r.row.executor.clone(),
                format_optional_timestamp(r.row.inicio),
                format_optional_timestamp(r.row.data_fim),
                r.row.base.clone(),
            ]
        })
        .collect();

    println!("\n{}", style("Detalhes").bold());
    let mut lines = render_table(&DETAIL_COLUMNS, &rows).into_iter();
    if let Some(header) = lines.next() {
        println!("{}", style(header).underlined());
    }
    for line in lines {
        println!("{}", line);
    }
}
