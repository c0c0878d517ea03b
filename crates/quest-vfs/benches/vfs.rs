//! Benchmarks for path resolution and core filesystem operations.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use quest_vfs::VirtualFileSystem;
use quest_vfs::path::resolve;

fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve_relative_dotdot", |b| {
        b.iter(|| {
            resolve(
                black_box("../user/./Documents/../Music/$USER/~x"),
                black_box("/home/user/Desktop"),
                "/home/user",
                "user",
            )
        });
    });
}

fn bench_write_cat(c: &mut Criterion) {
    let mut fs = VirtualFileSystem::default();
    c.bench_function("write_then_cat", |b| {
        b.iter(|| {
            fs.write(black_box("Documents/bench.txt"), "payload\n", false)
                .unwrap();
            black_box(fs.cat("Documents/bench.txt").unwrap().len())
        });
    });
}

fn bench_ls_detailed(c: &mut Criterion) {
    let mut fs = VirtualFileSystem::default();
    for i in 0..200 {
        fs.touch(&format!("/tmp/file_{i}")).unwrap();
    }
    c.bench_function("ls_detailed_200", |b| {
        b.iter(|| black_box(fs.ls_detailed("/tmp", true).unwrap().len()));
    });
}

fn bench_checkpoint(c: &mut Criterion) {
    let mut fs = VirtualFileSystem::default();
    fs.mkdir("/tmp/a/b/c/d", true).unwrap();
    c.bench_function("checkpoint_restore", |b| {
        b.iter(|| {
            fs.save_checkpoint();
            fs.rm("/", true, false).unwrap();
            black_box(fs.restore_checkpoint())
        });
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_write_cat,
    bench_ls_detailed,
    bench_checkpoint
);
criterion_main!(benches);
