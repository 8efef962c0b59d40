use fieldexpr::{cache_stats, evaluate, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

const EXPRESSIONS: &[&str] = &[
    "left_pad(code, \"0\", 8)",
    "n * 2 + 1",
    "n > 100 && code != \"\"",
    "contact(code, \"-\", n)",
    "sub_str(code, 0, 2)",
];

fn expected(expr: &str, n: i64, code: &str) -> Value {
    match expr {
        "left_pad(code, \"0\", 8)" => Value::String(format!("{:0>8}", code)),
        "n * 2 + 1" => Value::Int(n * 2 + 1),
        "n > 100 && code != \"\"" => Value::Bool(n > 100),
        "contact(code, \"-\", n)" => Value::String(format!("{}-{}", code, n)),
        "sub_str(code, 0, 2)" => Value::String(code[..2].to_string()),
        _ => unreachable!(),
    }
}

#[test]
fn concurrent_evaluation_shares_parsed_expressions() {
    let threads = num_cpus::get().max(2);
    let iterations = 200;
    let failures = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let failures = Arc::clone(&failures);
            thread::spawn(move || {
                for i in 0..iterations {
                    let n = (t * iterations + i) as i64;
                    let code = format!("C{}", n);
                    let mut vars = HashMap::new();
                    vars.insert("n".to_string(), Value::Int(n));
                    vars.insert("code".to_string(), Value::String(code.clone()));

                    for expr in EXPRESSIONS {
                        match evaluate(expr, &vars) {
                            Ok(v) if v == expected(expr, n, &code) => {}
                            _ => {
                                failures.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(failures.load(std::sync::atomic::Ordering::Relaxed), 0);

    let stats = cache_stats();
    assert!(stats.entries >= EXPRESSIONS.len());
    // Every evaluation after the first few per expression must be a hit
    assert!(stats.hits >= (threads * iterations * EXPRESSIONS.len() - threads * EXPRESSIONS.len()) as u64);
    assert!(stats.hit_rate() > 0.9);
}

#[test]
fn cached_and_fresh_results_agree() {
    let mut vars = HashMap::new();
    vars.insert("n".to_string(), Value::Int(7));
    vars.insert("code".to_string(), Value::String("AB12".into()));

    for expr in EXPRESSIONS {
        let first = evaluate(expr, &vars).unwrap();
        let second = evaluate(expr, &vars).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, expected(expr, 7, "AB12"));
    }

    // Different variables against the same cached tree
    vars.insert("n".to_string(), Value::Int(500));
    assert_eq!(evaluate("n * 2 + 1", &vars).unwrap(), Value::Int(1001));
}
