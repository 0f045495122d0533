use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use page_builder::logging::{LogEvent, LogSink};
use page_builder::{
    DropEvent, EditorConfig, Geometry, GeometryPatch, Logger, LoggingResult, MemoryPersistence,
    PageEditor, TransferData,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const TAGS: [&str; 5] = ["text", "image", "video", "container", "header"];

fn build_editor() -> PageEditor {
    let mut config = EditorConfig::default().with_logger(Logger::new(NullSink));
    config.enable_metrics();
    PageEditor::new("bench", config)
}

fn populated_editor(items: u32) -> PageEditor {
    let mut editor = build_editor();
    for n in 0..items {
        let tag = TAGS[n as usize % TAGS.len()];
        editor.create(tag, Some(Geometry::new(n % 12, n / 12 * 2, 1, 2)));
    }
    editor
}

fn toolbox_drop_script(c: &mut Criterion) {
    c.bench_function("toolbox_drop_script", |b| {
        b.iter(|| {
            let mut editor = build_editor();
            for n in 0..64u32 {
                let tag = TAGS[n as usize % TAGS.len()];
                let transfer = editor.begin_toolbox_drag(tag);
                let placeholder = format!("drop-{n}");
                editor.reconcile_layout(&[GeometryPatch::new(
                    placeholder.as_str(),
                    Geometry::new(n % 12, n / 12, 1, 2),
                )]);
                editor.drop(
                    DropEvent::toolbox(transfer, Geometry::new(n % 12, n / 12, 0, 0))
                        .with_placeholder(placeholder),
                );
            }
            black_box(editor.snapshot());
        });
    });
}

fn reconcile_full_layout(c: &mut Criterion) {
    let mut editor = populated_editor(200);
    let mut shift = 0u32;
    c.bench_function("reconcile_full_layout", |b| {
        b.iter(|| {
            shift = (shift + 1) % 12;
            let patches: Vec<GeometryPatch> = editor
                .snapshot()
                .iter()
                .map(|item| {
                    let mut geometry = item.geometry;
                    geometry.x = (geometry.x + shift) % 12;
                    GeometryPatch::new(item.id.as_str(), geometry)
                })
                .collect();
            black_box(editor.reconcile_layout(black_box(&patches)));
        });
    });
}

fn save_round_trip(c: &mut Criterion) {
    let mut editor = populated_editor(200);
    let mut persistence = MemoryPersistence::new();
    c.bench_function("save_round_trip", |b| {
        b.iter(|| {
            if let Some(first) = editor.snapshot().first() {
                editor
                    .edit_field(&first.id, "content", "bench".into(), false)
                    .expect("edit");
            }
            editor.save(&mut persistence).expect("save");
            black_box(editor.poll_saves(&mut persistence));
        });
    });
}

fn ignored_drop(c: &mut Criterion) {
    let mut editor = build_editor();
    c.bench_function("ignored_drop", |b| {
        b.iter(|| {
            black_box(editor.drop(DropEvent::toolbox(
                TransferData::empty(),
                Geometry::default(),
            )));
        });
    });
}

criterion_group!(
    editor_benches,
    toolbox_drop_script,
    reconcile_full_layout,
    save_round_trip,
    ignored_drop
);
criterion_main!(editor_benches);
