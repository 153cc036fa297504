//! Plain-text rendering of a [`Report`]
//!
//! One block per query, in run order. Empty results print `(no data)`, failed
//! queries print an `error:` line, truncated traversals print a warning.

use std::error::Error;
use std::io::{self, Write};

use crate::queries::{
    Contributors, ManagerRanking, PathStep, ProductDesigners, ProductRow, ProgrammerFrequency,
    QueryResult,
};
use crate::runner::Report;

/// Write `report` to `out`
pub fn render_report<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
    block(out, "1. Highest-selling product", &report.highest_seller, |out, p| {
        writeln!(out, "  {}", product_line(p))
    })?;
    block(
        out,
        "2. People involved in the highest-selling product",
        &report.highest_seller_contributors,
        render_contributors,
    )?;
    block(
        out,
        "3. Designers of the lowest-selling product",
        &report.lowest_seller_designers,
        render_designers,
    )?;
    block(
        out,
        "4. Programmer(s) most involved in the top 10 best sellers",
        &report.top_programmers,
        render_programmers,
    )?;
    block(
        out,
        "5. Manager(s) with the highest product sales",
        &report.top_managers,
        render_managers,
    )
}

fn block<W, T, F>(out: &mut W, title: &str, result: &QueryResult<T>, body: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce(&mut W, &T) -> io::Result<()>,
{
    writeln!(out, "== {title}")?;
    match result {
        Ok(Some(value)) => body(out, value)?,
        Ok(None) => writeln!(out, "  (no data)")?,
        Err(err) => writeln!(out, "  error: {}", with_causes(err))?,
    }
    writeln!(out)
}

/// `err` followed by each of its sources, colon separated
fn with_causes(err: &dyn Error) -> String {
    let mut line = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        line.push_str(&format!(": {inner}"));
        cause = inner.source();
    }
    line
}

fn product_line(p: &ProductRow) -> String {
    format!(
        "{} {} (index {}, price {}, daily_sales {})",
        p.node, p.name, p.index, p.price, p.daily_sales
    )
}

fn chain(product: &ProductRow, steps: &[PathStep]) -> String {
    let mut line = format!("({} {})", product.node, product.name);
    for step in steps {
        line.push_str(&format!(
            "<-[{}]-({} {}: {})",
            step.rel_type, step.person.node, step.person.label, step.person.name
        ));
    }
    line
}

fn truncation_warning<W: Write>(out: &mut W, truncated: bool) -> io::Result<()> {
    if truncated {
        writeln!(out, "  warning: traversal hit its depth bound; results are truncated")?;
    }
    Ok(())
}

fn render_contributors<W: Write>(out: &mut W, c: &Contributors) -> io::Result<()> {
    writeln!(out, "  product: {}", product_line(&c.product))?;
    writeln!(out, "  paths:")?;
    for path in &c.paths {
        writeln!(out, "    {}", chain(&c.product, path))?;
    }
    writeln!(out, "  people:")?;
    for person in &c.people {
        writeln!(out, "    {} {}: {} (age {})", person.node, person.label, person.name, person.age)?;
    }
    truncation_warning(out, c.truncated)
}

fn render_designers<W: Write>(out: &mut W, d: &ProductDesigners) -> io::Result<()> {
    writeln!(out, "  product: {}", product_line(&d.product))?;
    if d.designers.is_empty() {
        writeln!(out, "  designers: (none)")?;
    } else {
        writeln!(out, "  designers:")?;
    }
    for designer in &d.designers {
        writeln!(out, "    {} {}", designer.node, designer.name)?;
    }
    truncation_warning(out, d.truncated)
}

fn render_programmers<W: Write>(out: &mut W, f: &ProgrammerFrequency) -> io::Result<()> {
    writeln!(
        out,
        "  top {} products considered; maximum involvement {}",
        f.top_products.len(),
        f.max_count
    )?;
    for leader in &f.leaders {
        writeln!(out, "  leader: {} {}", leader.node, leader.name)?;
    }
    writeln!(out, "  involvement:")?;
    for (person, count) in &f.contributions {
        writeln!(out, "    {count:>3}  {} {}", person.node, person.name)?;
    }
    Ok(())
}

fn render_managers<W: Write>(out: &mut W, r: &ManagerRanking) -> io::Result<()> {
    for leader in &r.leaders {
        writeln!(
            out,
            "  leader: {} {} with total daily_sales {}",
            leader.manager.node, leader.manager.name, leader.total_sales
        )?;
    }
    writeln!(out, "  standings:")?;
    for s in &r.standings {
        writeln!(
            out,
            "    {:>8}  {} {} ({} products)",
            s.total_sales,
            s.manager.node,
            s.manager.name,
            s.products.len()
        )?;
    }
    Ok(())
}
