/// Compose — load a word bank and print generated formulas.
///
/// Usage: compose [--bank <path>] [--formulas <path>] [--seed <n>]
///                [--formula <i>] [--count <n>]
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::process;

use word_alchemy::core::formula::{Composer, FormulaSet};
use word_alchemy::core::loader;
use word_alchemy::core::publisher::{Publisher, StdoutPublisher};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut bank_path = "data/word_bank.txt".to_string();
    let mut formulas_path: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut formula_index: Option<usize> = None;
    let mut count: usize = 1;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bank" if i + 1 < args.len() => {
                i += 1;
                bank_path = args[i].clone();
            }
            "--formulas" if i + 1 < args.len() => {
                i += 1;
                formulas_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse() {
                    Ok(n) => seed = Some(n),
                    Err(_) => {
                        eprintln!("Invalid seed: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--formula" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse() {
                    Ok(n) => formula_index = Some(n),
                    Err(_) => {
                        eprintln!("Invalid formula index: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse() {
                    Ok(n) if n > 0 => count = n,
                    _ => {
                        eprintln!("Invalid count: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let store = match loader::load_bank(Path::new(&bank_path)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("ERROR loading word bank {}: {}", bank_path, e);
            process::exit(1);
        }
    };

    let formulas = match formulas_path {
        Some(ref path) => match FormulaSet::load_from_ron(Path::new(path)) {
            Ok(set) => set,
            Err(e) => {
                eprintln!("ERROR loading formulas {}: {}", path, e);
                process::exit(1);
            }
        },
        None => FormulaSet::builtin(),
    };

    let mut rng = match seed {
        Some(n) => StdRng::seed_from_u64(n),
        None => StdRng::from_entropy(),
    };

    let composer = Composer::new(&store, &formulas);
    let mut publisher = StdoutPublisher;

    for run in 0..count {
        if run > 0 {
            println!();
        }
        let result = match formula_index {
            Some(index) => composer.compose_formula(index, &mut rng),
            None => composer.compose(&mut rng),
        };
        match result {
            Ok(text) => {
                if let Err(e) = publisher.publish(&text) {
                    eprintln!("ERROR publishing: {}", e);
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("ERROR composing: {}", e);
                process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Compose — load a word bank and print generated formulas.");
    println!();
    println!("Usage: compose [--bank <path>] [--formulas <path>] [--seed <n>]");
    println!("               [--formula <i>] [--count <n>]");
    println!();
    println!("  --bank <path>      Word bank file (default: data/word_bank.txt)");
    println!("  --formulas <path>  Formula set RON file (default: builtin seven)");
    println!("  --seed <n>         RNG seed (default: from entropy)");
    println!("  --formula <i>      Compose a specific formula index instead of a random one");
    println!("  --count <n>        Number of formulas to compose (default: 1)");
}
