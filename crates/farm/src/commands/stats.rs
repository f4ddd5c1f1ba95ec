//! `farm stats` -- the dashboard, in the terminal.

use anyhow::Result;

use farm_core::dates::today;
use farm_report::dashboard::{Dashboard, dashboard};

use crate::cli::StatsArgs;
use crate::context::RuntimeContext;
use crate::output::{amount, output_json, percent};

pub fn run(ctx: &RuntimeContext, args: &StatsArgs) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let board = dashboard(&store, args.range.range(), today())?;

    if ctx.json {
        output_json(&board)
    } else {
        if !ctx.quiet {
            print_dashboard(&board);
        }
        Ok(())
    }
}

fn print_dashboard(d: &Dashboard) {
    let cur = &d.currency;
    match (d.range.from, d.range.to) {
        (None, None) => println!("{}", d.farm_name),
        (from, to) => println!(
            "{} ({} to {})",
            d.farm_name,
            from.map(|f| f.to_string()).unwrap_or_else(|| "start".into()),
            to.map(|t| t.to_string()).unwrap_or_else(|| "today".into()),
        ),
    }
    println!();

    let e = &d.eggs;
    println!("Eggs");
    println!("  Collected:     {} ({} good, {} broken)", e.total_eggs, e.good_eggs, e.broken_eggs);
    println!("  Grades A/B/C:  {}/{}/{}", e.grade_a, e.grade_b, e.grade_c);
    println!("  Damage rate:   {}", percent(e.damage_rate));
    println!("  Per day:       {}", amount(e.average_per_day));
    if let Some(best) = &e.best_day {
        println!("  Best day:      {} ({})", best.date, best.total_eggs);
    }
    println!();

    let s = &d.sales;
    println!("Sales");
    println!("  Orders:        {}", s.orders);
    println!("  Revenue:       {} {cur}", amount(s.revenue));
    println!("  Collected:     {} {cur}", amount(s.collected));
    println!("  Outstanding:   {} {cur}", amount(s.outstanding));
    println!();

    let f = &d.feed;
    println!("Feed");
    println!("  Stock value:   {} {cur}", amount(f.total_stock_value));
    println!("  Used:          {}", amount(f.total_used));
    if !f.low_stock.is_empty() {
        println!("  Low stock:     {}", f.low_stock.join(", "));
    }
    println!();

    let fin = &d.finance;
    println!("Finance");
    println!("  Income:        {} {cur}", amount(fin.income));
    println!("  Expenses:      {} {cur}", amount(fin.expense));
    println!("  Net:           {} {cur}", amount(fin.net));
    println!();

    let t = &d.tasks;
    println!("Tasks");
    println!("  Total:         {}", t.total);
    println!("  Overdue:       {}", t.overdue);
    println!("  Completion:    {}", percent(t.completion_rate));

    if !d.recent_activity.is_empty() {
        println!();
        println!("Recent activity");
        for a in &d.recent_activity {
            println!(
                "  {}  {:<8} {} {}  by {}",
                a.created_at.format("%Y-%m-%d %H:%M"),
                a.action.to_string(),
                a.collection,
                a.summary,
                a.actor
            );
        }
    }
}
