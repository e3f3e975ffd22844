use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridscript_core::EngineOptions;
use gridscript_dsl::{parse_blocks, Lexer};

const SCRIPT_MIN: &str = r#"
* fires whenever someone moves
(0:66) when a player moves,
  (1:12) and the player holds at least 10 coins,
    (3:128) around where the player is standing,
      (4:7) keeping only blocks matching {stone},
        (5:254) place block ~block_id at each point.

(0:20) when a player says {hello},
  (5:30) greet them with %name.
"#;

fn bench_tokenize(c: &mut Criterion) {
    let lexer = Lexer::new(&EngineOptions::default()).expect("default options build");
    c.bench_function("dsl/tokenize_min", |b| {
        b.iter(|| {
            let count = lexer
                .tokenize(black_box(SCRIPT_MIN))
                .filter(|token| token.is_ok())
                .count();
            black_box(count);
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    let lexer = Lexer::new(&EngineOptions::default()).expect("default options build");
    c.bench_function("dsl/parse_min", |b| {
        b.iter(|| {
            let blocks = parse_blocks(&lexer, black_box(SCRIPT_MIN)).expect("script parses");
            black_box(blocks.len());
        });
    });
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
