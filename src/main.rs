//! Life Projection CLI
//!
//! Runs a monthly projection for a demo portfolio (or a model-point CSV) and
//! prints per-period cashflows.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use life_projection::assumptions::{ProductModel, TermLifeModel, UniversalLifeModel};
use life_projection::policy::{load_policy_groups, Policy, PolicyGroup, PremiumMode, Sex};
use life_projection::simulation::{estimate_premiums, run_cashflows, CashFlow, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Family {
    /// Term life: level premiums, sum assured on death
    Term,
    /// Universal life: account-based with investment crediting
    Universal,
}

#[derive(Parser, Debug)]
#[command(version, about = "Monthly life portfolio projection")]
struct Args {
    /// Number of months to simulate
    #[arg(long, default_value_t = 150)]
    months: u32,

    /// Product family for the run
    #[arg(long, value_enum, default_value = "term")]
    product: Family,

    /// Model-point CSV to load instead of the built-in demo portfolio
    #[arg(long)]
    policies: Option<PathBuf>,

    /// Seed for the universal-life investment path
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write per-month cashflows to this CSV path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn demo_term_portfolio() -> Vec<PolicyGroup> {
    vec![
        PolicyGroup::new(Policy::term(Sex::Male, 20, 0, 20, 200_000.0, 0.0), 100.0),
        PolicyGroup::new(Policy::term(Sex::Female, 45, 0, 20, 600_000.0, 0.0), 80.0),
        PolicyGroup::new(Policy::term(Sex::Male, 70, 0, 10, 400_000.0, 0.0), 50.0),
    ]
}

fn demo_universal_portfolio() -> Vec<PolicyGroup> {
    vec![
        PolicyGroup::new(
            Policy::account_based(Sex::Male, 50, 0, Some(15), 300_000.0, 150_000.0, PremiumMode::Single),
            60.0,
        ),
        PolicyGroup::new(
            Policy::account_based(Sex::Female, 40, 0, Some(20), 250_000.0, 900.0, PremiumMode::Level),
            90.0,
        ),
    ]
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Life Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("====================\n");

    let groups = match &args.policies {
        Some(path) => load_policy_groups(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("loading model points from {}", path.display()))?,
        None => match args.product {
            Family::Term => demo_term_portfolio(),
            Family::Universal => demo_universal_portfolio(),
        },
    };
    println!("Portfolio: {} policy groups, {} months\n", groups.len(), args.months);

    let (sim, groups) = match args.product {
        Family::Term => {
            let model = TermLifeModel::default_pricing();
            // Back-solve level premiums before the real run
            let priced = estimate_premiums(&model, &groups, args.months);
            for (i, group) in priced.iter().enumerate() {
                println!(
                    "  group {}: age {}, premium {:>10.2}, count {:>8.2}",
                    i + 1,
                    group.policy.issue_age,
                    group.policy.premium,
                    group.count
                );
            }
            println!();
            (Simulation::new(ProductModel::Term(model)), priced)
        }
        Family::Universal => {
            let model = UniversalLifeModel::default_pricing(args.months as usize, args.seed);
            (Simulation::new(ProductModel::Universal(model)), groups)
        }
    };

    let flows = run_cashflows(&sim, groups, args.months);

    println!(
        "{:>5} {:>14} {:>14} {:>14} {:>12} {:>12} {:>14} {:>14}",
        "Month", "Premiums", "Claims", "Expenses", "Commission", "Investment", "Net", "Discounted"
    );
    println!("{}", "-".repeat(106));
    for (month, flow) in flows.iter().enumerate().take(24) {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2}",
            month,
            flow.premiums,
            flow.claims,
            flow.expenses,
            flow.commissions,
            flow.investments,
            flow.net,
            flow.discounted,
        );
    }
    if flows.len() > 24 {
        println!("... ({} more months)", flows.len() - 24);
    }

    let total: CashFlow = flows.iter().copied().sum();
    println!("\nSummary:");
    println!("  Total premiums:    {:>16.2}", total.premiums);
    println!("  Total claims:      {:>16.2}", total.claims);
    println!("  Total expenses:    {:>16.2}", total.expenses);
    println!("  Total commissions: {:>16.2}", total.commissions);
    println!("  Net cashflow:      {:>16.2}", total.net);
    println!("  Present value:     {:>16.2}", total.discounted);

    if let Some(path) = &args.output {
        let mut file = File::create(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        writeln!(
            file,
            "Month,Premiums,Investments,Claims,Expenses,Commissions,AccountValueChanges,Net,Discounted"
        )?;
        for (month, flow) in flows.iter().enumerate() {
            writeln!(
                file,
                "{},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8}",
                month,
                flow.premiums,
                flow.investments,
                flow.claims,
                flow.expenses,
                flow.commissions,
                flow.account_value_changes,
                flow.net,
                flow.discounted,
            )?;
        }
        println!("\nFull results written to: {}", path.display());
    }

    Ok(())
}
