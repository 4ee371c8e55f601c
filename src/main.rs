use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use montecarlo_risk::finance::{
    black_scholes_price, calculate_var, monte_carlo_option_price, monte_carlo_var, EuropeanOption,
    GbmParams, GbmTerminal, OptionType, VarMethod, VarParams,
};
use montecarlo_risk::trading::{
    estimate_ruin, DrawdownSimulation, RuinConfig, StrategyConfig, TradeSimulation,
};
use montecarlo_risk::monte_carlo::DEFAULT_CONFIDENCE_LEVEL;
use montecarlo_risk::{
    EngineConfig, ExecutionMode, MonteCarloEngine, RandomStream, SimulationResult,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "montecarlo-risk")]
#[command(about = "Monte Carlo risk simulation for trading strategies and derivatives")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit a JSON report instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Engine configuration file (JSON); flags below override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(short = 'n', long, global = true, env = "MCRISK_SIMULATIONS")]
    simulations: Option<usize>,

    /// Master seed for reproducible runs
    #[arg(short, long, global = true, env = "MCRISK_SEED")]
    seed: Option<u64>,

    /// Run trials on the rayon pool
    #[arg(short, long, global = true, env = "MCRISK_PARALLEL")]
    parallel: bool,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct StrategyArgs {
    /// Probability of a winning trade
    #[arg(short, long, default_value = "0.55")]
    win_rate: f64,

    /// Average win in R-multiples
    #[arg(long, default_value = "1.5")]
    avg_win: f64,

    /// Average loss in R-multiples
    #[arg(long, default_value = "1.0")]
    avg_loss: f64,
}

impl StrategyArgs {
    fn strategy(&self) -> StrategyConfig {
        StrategyConfig::new(self.win_rate, self.avg_win, self.avg_loss)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Distribution of final capital after a run of trades
    Trades {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Trades per equity curve
        #[arg(short = 't', long, default_value = "100")]
        n_trades: usize,

        /// Starting capital
        #[arg(long, default_value = "10000")]
        initial_capital: f64,

        /// Fraction of capital risked per trade
        #[arg(short, long, default_value = "0.01")]
        risk: f64,
    },

    /// Distribution of maximum drawdown
    Drawdown {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Trades per equity curve
        #[arg(short = 't', long, default_value = "100")]
        n_trades: usize,

        /// Starting capital
        #[arg(long, default_value = "10000")]
        initial_capital: f64,

        /// Fraction of capital risked per trade
        #[arg(short, long, default_value = "0.01")]
        risk: f64,
    },

    /// Probability of losing a given fraction of capital
    Ruin {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Trading horizon
        #[arg(short = 't', long, default_value = "500")]
        n_trades: usize,

        /// Fraction of capital risked per trade
        #[arg(short, long, default_value = "0.02")]
        risk: f64,

        /// Loss fraction that counts as ruin
        #[arg(long, default_value = "0.5")]
        threshold: f64,
    },

    /// Terminal price distribution under Geometric Brownian Motion
    Gbm {
        /// Initial price
        #[arg(long, default_value = "100")]
        s0: f64,

        /// Annual drift
        #[arg(long, default_value = "0.05")]
        mu: f64,

        /// Annual volatility
        #[arg(long, default_value = "0.2")]
        sigma: f64,

        /// Horizon in years
        #[arg(long, default_value = "1.0")]
        horizon: f64,

        /// Time steps per path
        #[arg(long, default_value = "252")]
        steps: usize,
    },

    /// Price a European option by simulation
    Option {
        /// call or put
        #[arg(short = 'k', long, default_value = "call")]
        kind: OptionType,

        #[arg(long, default_value = "100")]
        spot: f64,

        #[arg(long, default_value = "105")]
        strike: f64,

        /// Risk-free rate
        #[arg(long, default_value = "0.05")]
        rate: f64,

        /// Annual volatility
        #[arg(long, default_value = "0.2")]
        sigma: f64,

        /// Time to expiry in years
        #[arg(long, default_value = "1.0")]
        expiry: f64,
    },

    /// Value at Risk from a normal return model, or from observed returns
    Var {
        /// Expected daily return
        #[arg(long, default_value = "0.0005")]
        mu: f64,

        /// Daily volatility
        #[arg(long, default_value = "0.02")]
        sigma: f64,

        #[arg(long, default_value = "10000")]
        investment: f64,

        /// Holding period in days
        #[arg(long, default_value = "1")]
        horizon: usize,

        #[arg(long, default_value = "0.95")]
        confidence: f64,

        /// File of periodic returns (one per line) for historical and parametric VaR
        #[arg(long)]
        returns: Option<PathBuf>,
    },
}

/// Resolve the engine configuration: file first, then flags and environment.
fn engine_config(args: &Args, default_simulations: usize) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&raw)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => EngineConfig {
            n_simulations: default_simulations,
            ..Default::default()
        },
    };

    if let Some(n) = args.simulations {
        config.n_simulations = n;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.parallel {
        config.mode = ExecutionMode::Parallel;
    }
    config.validate()?;
    Ok(config)
}

fn load_returns(path: &Path) -> Result<Vec<f64>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read returns from {}", path.display()))?;
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .map(|(i, line)| {
            line.parse::<f64>()
                .with_context(|| format!("Invalid return on data line {}: '{}'", i + 1, line))
        })
        .collect()
}

fn print_banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn print_json(report: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn distribution_report(result: &SimulationResult) -> Result<serde_json::Value> {
    let (lower, upper) = result.confidence_interval(DEFAULT_CONFIDENCE_LEVEL)?;
    Ok(json!({
        "summary": result.summary(),
        "confidence_interval_95": [lower, upper],
    }))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing; RUST_LOG adds directives on top of the verbosity level
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("montecarlo_risk={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Commands::Trades {
            strategy,
            n_trades,
            initial_capital,
            risk,
        } => {
            let config = engine_config(&args, 10_000)?;
            let simulation = TradeSimulation::new(strategy.strategy(), *n_trades)
                .with_initial_capital(*initial_capital)
                .with_risk_per_trade(*risk);
            simulation.validate()?;

            info!(
                "Simulating {} equity curves of {} trades ({} mode)",
                config.n_simulations, n_trades, config.mode
            );
            let result = MonteCarloEngine::new(config).run(&simulation)?;

            if args.json {
                let mut report = distribution_report(&result)?;
                report["simulation"] = json!(simulation);
                report["prob_loss"] = json!(result.prob_below(*initial_capital));
                return print_json(&report);
            }

            print_banner("EQUITY CURVE");
            println!(
                "Win Rate: {:.1}% | Avg Win: {:.2}R | Avg Loss: {:.2}R | Edge: {:+.3}R",
                strategy.win_rate * 100.0,
                strategy.avg_win,
                strategy.avg_loss,
                simulation.strategy.expected_r()
            );
            println!("Trades: {} | Risk: {:.1}% | Start: ${:.0}", n_trades, risk * 100.0, initial_capital);
            println!();
            println!("{}", result);
            println!(
                "P(final < start): {:.2}%",
                result.prob_below(*initial_capital) * 100.0
            );
        }

        Commands::Drawdown {
            strategy,
            n_trades,
            initial_capital,
            risk,
        } => {
            let config = engine_config(&args, 10_000)?;
            let simulation = DrawdownSimulation::new(strategy.strategy(), *n_trades)
                .with_initial_capital(*initial_capital)
                .with_risk_per_trade(*risk);
            simulation.validate()?;

            info!(
                "Simulating max drawdown over {} trades ({} trials)",
                n_trades, config.n_simulations
            );
            let result = MonteCarloEngine::new(config).run(&simulation)?;

            if args.json {
                let mut report = distribution_report(&result)?;
                report["simulation"] = json!(simulation);
                report["prob_drawdown_above_20pct"] = json!(result.prob_above(0.2));
                return print_json(&report);
            }

            print_banner("MAX DRAWDOWN");
            println!("{}", result);
            println!("Median drawdown: {:.2}%", result.median() * 100.0);
            println!("95th percentile: {:.2}%", result.percentile_95() * 100.0);
            println!("P(drawdown > 20%): {:.2}%", result.prob_above(0.2) * 100.0);
        }

        Commands::Ruin {
            strategy,
            n_trades,
            risk,
            threshold,
        } => {
            let config = engine_config(&args, 10_000)?;
            let ruin = RuinConfig::new(strategy.strategy())
                .with_n_trades(*n_trades)
                .with_risk_per_trade(*risk)
                .with_ruin_threshold(*threshold);

            info!(
                "Estimating risk of ruin over {} trades ({} trials)",
                n_trades, config.n_simulations
            );
            let estimate = estimate_ruin(&ruin, &config)?;
            let (lower, upper) = estimate.confidence_interval(1.96);

            if args.json {
                return print_json(&json!({
                    "config": ruin,
                    "probability": estimate.probability(),
                    "standard_error": estimate.standard_error(),
                    "confidence_interval_95": [lower, upper],
                    "ruined": estimate.hits,
                    "n_simulations": estimate.n_simulations,
                }));
            }

            print_banner("RISK OF RUIN");
            println!(
                "Ruin = losing {:.0}% of capital within {} trades at {:.1}% risk",
                threshold * 100.0,
                n_trades,
                risk * 100.0
            );
            println!("Estimate: {}", estimate);
            println!("95% interval: [{:.4}, {:.4}]", lower, upper);
        }

        Commands::Gbm {
            s0,
            mu,
            sigma,
            horizon,
            steps,
        } => {
            let config = engine_config(&args, 10_000)?;
            let params = GbmParams::new(*s0, *mu, *sigma, *horizon);
            let source = GbmTerminal::new(params, *steps)?;

            info!(
                "Simulating {} GBM paths of {} steps",
                config.n_simulations, steps
            );
            let result = MonteCarloEngine::new(config).run(&source)?;

            if args.json {
                let mut report = distribution_report(&result)?;
                report["params"] = json!(params);
                report["expected_terminal"] = json!(params.expected_terminal());
                return print_json(&report);
            }

            print_banner("GBM TERMINAL PRICE");
            println!("{}", result);
            println!("Analytic E[S_T]: {:.4}", params.expected_terminal());
            println!("P(S_T < S_0): {:.2}%", result.prob_below(*s0) * 100.0);
        }

        Commands::Option {
            kind,
            spot,
            strike,
            rate,
            sigma,
            expiry,
        } => {
            let config = engine_config(&args, 100_000)?;
            let option = EuropeanOption {
                option_type: *kind,
                spot: *spot,
                strike: *strike,
                rate: *rate,
                sigma: *sigma,
                expiry: *expiry,
            };

            info!("Pricing European {} with {} paths", kind, config.n_simulations);
            let mut rng = RandomStream::from_seed(config.seed);
            let price = monte_carlo_option_price(&option, config.n_simulations, &mut rng)?;
            let closed_form = black_scholes_price(&option)?;
            let (lower, upper) = price.interval(1.96);

            if args.json {
                return print_json(&json!({
                    "option": option,
                    "monte_carlo": price,
                    "confidence_interval_95": [lower, upper],
                    "black_scholes": closed_form,
                }));
            }

            print_banner("EUROPEAN OPTION");
            println!(
                "{} | S={:.2} K={:.2} r={:.2}% σ={:.2}% T={:.2}y",
                kind,
                spot,
                strike,
                rate * 100.0,
                sigma * 100.0,
                expiry
            );
            println!("Monte Carlo:   {:.4} (se {:.4})", price.price, price.standard_error);
            println!("95% interval:  [{:.4}, {:.4}]", lower, upper);
            println!("Black-Scholes: {:.4}", closed_form);
        }

        Commands::Var {
            mu,
            sigma,
            investment,
            horizon,
            confidence,
            returns,
        } => {
            let config = engine_config(&args, 10_000)?;
            let params = VarParams {
                investment: *investment,
                horizon_days: *horizon,
                confidence_level: *confidence,
                ..VarParams::new(*mu, *sigma)
            };

            info!("Simulating {}-day VaR with {} draws", horizon, config.n_simulations);
            let mut rng = RandomStream::from_seed(config.seed);
            let simulated = monte_carlo_var(&params, config.n_simulations, &mut rng)?;

            let observed = match returns {
                Some(path) => {
                    let series = load_returns(path)?;
                    info!("Loaded {} returns from {}", series.len(), path.display());
                    Some((
                        calculate_var(&series, *confidence, *investment, VarMethod::Historical)?,
                        calculate_var(&series, *confidence, *investment, VarMethod::Parametric)?,
                    ))
                }
                None => None,
            };

            if args.json {
                return print_json(&json!({
                    "params": params,
                    "monte_carlo": simulated,
                    "historical": observed.map(|(historical, _)| historical),
                    "parametric": observed.map(|(_, parametric)| parametric),
                }));
            }

            print_banner("VALUE AT RISK");
            println!(
                "{:.0}% confidence, {}-day horizon, ${:.0} invested",
                confidence * 100.0,
                horizon,
                investment
            );
            println!("Monte Carlo VaR: ${:.2}", simulated);
            if let Some((historical, parametric)) = observed {
                println!("Historical VaR:  ${:.2}", historical);
                println!("Parametric VaR:  ${:.2}", parametric);
            }
        }
    }

    Ok(())
}
