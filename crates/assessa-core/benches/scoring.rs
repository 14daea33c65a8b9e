use criterion::{black_box, criterion_group, criterion_main, Criterion};

use assessa_core::answer::{Answer, AnswerStore};
use assessa_core::model::Question;
use assessa_core::scoring::{percent_half_up, score};

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| match i % 3 {
            0 => Question::multiple_choice(
                format!("q{i}"),
                "Pick the safe option",
                vec!["Safe".into(), "Unsafe".into(), "Unknown".into()],
                "Safe",
            ),
            1 => Question::true_false(format!("q{i}"), "Is this allowed?", i % 2 == 0),
            _ => Question::short_answer(format!("q{i}"), "Name it", "Lockout Tagout")
                .with_points(3),
        })
        .collect()
}

fn answer_all(questions: &[Question]) -> AnswerStore {
    let mut store = AnswerStore::new();
    for (i, q) in questions.iter().enumerate() {
        let answer = match q.question_type() {
            assessa_core::QuestionType::MultipleChoice => Answer::Choice("Safe".into()),
            assessa_core::QuestionType::TrueFalse => Answer::Boolean(i % 4 == 0),
            assessa_core::QuestionType::ShortAnswer => Answer::Text("  lockout TAGOUT ".into()),
        };
        store.set(q, answer).unwrap();
    }
    store
}

fn bench_percent(c: &mut Criterion) {
    c.bench_function("percent_half_up", |b| {
        b.iter(|| percent_half_up(black_box(10), black_box(15)))
    });
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [3usize, 30, 300] {
        let questions = make_questions(n);
        let full = answer_all(&questions);
        let empty = AnswerStore::new();

        group.bench_function(format!("answered/{n}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&full)))
        });
        group.bench_function(format!("unanswered/{n}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&empty)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_percent, bench_score);
criterion_main!(benches);
