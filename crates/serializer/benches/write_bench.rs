use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use http::{Response, StatusCode};
use micro_serializer::body::{ChannelBody, FullBody};
use micro_serializer::codec::{HeaderEncoder, chunked, prepare};
use micro_serializer::connection::{WriteCoordinator, write_blocking, write_message};
use micro_serializer::protocol::{PayloadSize, WriteBufs};
use std::hint::black_box;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio_util::codec::Encoder;

// Sink counting written bytes
#[derive(Default)]
struct MockIO {
    written: usize,
}

impl io::Write for MockIO {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written += buf.len();
        Ok(buf.len())
    }

    fn write_vectored(&mut self, bufs: &[io::IoSlice<'_>]) -> io::Result<usize> {
        let n = bufs.iter().map(|b| b.len()).sum();
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.written += buf.len();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<Result<usize, io::Error>> {
        let n = bufs.iter().map(|b| b.len()).sum();
        self.written += n;
        Poll::Ready(Ok(n))
    }

    fn is_write_vectored(&self) -> bool {
        true
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

fn response() -> Response<()> {
    Response::builder()
        .status(StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "text/plain")
        .header(http::header::SERVER, "micro-serializer")
        .body(())
        .unwrap()
}

fn bench_header_encoder(c: &mut Criterion) {
    c.bench_function("encode_response_head", |b| {
        b.iter(|| {
            let mut dst = BytesMut::new();
            HeaderEncoder.encode((response().into(), PayloadSize::Length(12)), &mut dst).unwrap();
            black_box(dst);
        });
    });
}

fn bench_chunk_framer(c: &mut Criterion) {
    let data = Bytes::from(vec![b'x'; 16 * 1024]);

    c.bench_function("frame_16k_chunk", |b| {
        b.iter(|| black_box(chunked::encode(WriteBufs::from(data.clone()))));
    });
}

fn bench_write_engines(c: &mut Criterion) {
    let body = Bytes::from(vec![b'x'; 256 * 1024]);
    let prepared = prepare(response().into(), PayloadSize::Length(body.len() as u64)).unwrap();

    let mut group = c.benchmark_group("write_256k_body");
    group.bench_function("blocking", |b| {
        b.iter(|| {
            let mut io = MockIO::default();
            let mut coordinator = WriteCoordinator::from_prepared(prepared.clone(), FullBody::new(body.clone()));
            write_blocking(&mut io, &mut coordinator).unwrap();
            black_box(io.written);
        });
    });
    group.bench_function("nonblocking", |b| {
        b.iter(|| {
            let mut io = MockIO::default();
            let mut coordinator = WriteCoordinator::from_prepared(prepared.clone(), FullBody::new(body.clone()));
            block_on(write_message(&mut io, &mut coordinator)).unwrap();
            black_box(io.written);
        });
    });
    group.finish();
}

fn bench_channel_body(c: &mut Criterion) {
    let slice = Bytes::from(vec![b'x'; 1024]);

    c.bench_function("chunked_channel_body_64_slices", |b| {
        b.iter(|| {
            let (mut sender, body) = ChannelBody::channel();
            for _ in 0..64 {
                sender.send(slice.clone());
            }
            sender.finish();

            let mut io = MockIO::default();
            let mut coordinator = WriteCoordinator::new(response(), body);
            block_on(write_message(&mut io, &mut coordinator)).unwrap();
            black_box(io.written);
        });
    });
}

criterion_group!(benches, bench_header_encoder, bench_chunk_framer, bench_write_engines, bench_channel_body);
criterion_main!(benches);
