use std::collections::VecDeque;

use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;

use crate::{Block, MemDevice, Storage, StorageError, Stream};

const MAX_STREAM_SIZE: u32 = 48;
const MAX_OPS: usize = 96;

#[derive(Debug, Clone)]
enum StreamOp {
    WriteByte(u8),
    WriteBulk(Vec<u8>),
    ReadByte,
    ReadBulk(usize),
    Peek,
    Clear,
}

fn stream_op_strategy(size: u32) -> BoxedStrategy<StreamOp> {
    // Chunks up to twice the stream size make clamping and wraparound the
    // common case rather than the rare one.
    let max_chunk = 2 * size as usize;
    prop_oneof![
        3 => any::<u8>().prop_map(StreamOp::WriteByte),
        4 => prop::collection::vec(any::<u8>(), 0..=max_chunk).prop_map(StreamOp::WriteBulk),
        3 => Just(StreamOp::ReadByte),
        3 => (0..=max_chunk).prop_map(StreamOp::ReadBulk),
        2 => Just(StreamOp::Peek),
        1 => Just(StreamOp::Clear),
    ]
    .boxed()
}

fn stream_scenario_strategy() -> BoxedStrategy<(u32, Vec<StreamOp>)> {
    (1u32..=MAX_STREAM_SIZE)
        .prop_flat_map(|size| {
            (
                Just(size),
                prop::collection::vec(stream_op_strategy(size), 1..=MAX_OPS),
            )
        })
        .boxed()
}

fn run_stream_ops(size: u32, ops: &[StreamOp]) -> TestCaseResult {
    let storage = Storage::new(MemDevice::new(size));
    let mut stream = Stream::new(&storage, size).unwrap();
    let mut model: VecDeque<u8> = VecDeque::new();

    for op in ops {
        match op {
            StreamOp::WriteByte(byte) => {
                let accepted = stream.write_byte(*byte).unwrap();
                let expected = usize::from(model.len() < size as usize);
                prop_assert_eq!(accepted, expected);
                if expected == 1 {
                    model.push_back(*byte);
                }
            }
            StreamOp::WriteBulk(data) => {
                let accepted = stream.write(data).unwrap();
                let expected = data.len().min(size as usize - model.len());
                prop_assert_eq!(accepted, expected);
                model.extend(&data[..expected]);
            }
            StreamOp::ReadByte => {
                prop_assert_eq!(stream.read_byte().unwrap(), model.pop_front());
            }
            StreamOp::ReadBulk(want) => {
                let mut buf = vec![0u8; *want];
                let got = stream.read(&mut buf).unwrap();
                let expected: Vec<u8> = model.drain(..(*want).min(model.len())).collect();
                prop_assert_eq!(got, expected.len());
                prop_assert_eq!(&buf[..got], expected.as_slice());
            }
            StreamOp::Peek => {
                prop_assert_eq!(stream.peek().unwrap(), model.front().copied());
            }
            StreamOp::Clear => {
                stream.clear();
                model.clear();
            }
        }
        prop_assert_eq!(stream.available() as usize, model.len());
        prop_assert_eq!(stream.room() + stream.available(), size);
    }
    Ok(())
}

fn block_span_strategy() -> BoxedStrategy<(u32, u32, Vec<u8>)> {
    (1u32..=128)
        .prop_flat_map(|size| {
            (0..size).prop_flat_map(move |offset| {
                let max_len = (size - offset) as usize;
                (
                    Just(size),
                    Just(offset),
                    prop::collection::vec(any::<u8>(), 0..=max_len),
                )
            })
        })
        .boxed()
}

proptest! {
    #[test]
    fn stream_matches_a_queue_model((size, ops) in stream_scenario_strategy()) {
        run_stream_ops(size, &ops)?;
    }

    #[test]
    fn alloc_sequences_are_disjoint_and_ascending(
        requests in prop::collection::vec(0u32..=96, 1..=32),
    ) {
        let capacity = 1024u32;
        let storage = Storage::new(MemDevice::new(capacity));
        let mut watermark = 0u32;

        for req in requests {
            match storage.alloc(req) {
                Ok(addr) => {
                    // Granted from the watermark: disjoint from and above
                    // every earlier range.
                    prop_assert_eq!(addr, watermark);
                    watermark += req;
                }
                Err(StorageError::OutOfSpace { requested, available }) => {
                    prop_assert_eq!(requested, req);
                    prop_assert_eq!(available, capacity - watermark);
                    prop_assert!(req > available);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            prop_assert_eq!(storage.watermark(), watermark);
        }
    }

    #[test]
    fn free_then_alloc_reuses_the_address(
        sizes in prop::collection::vec(1u32..=32, 2..=8),
    ) {
        let storage = Storage::new(MemDevice::new(4096));
        let mut addrs = Vec::new();
        for size in &sizes {
            addrs.push((storage.alloc(*size).unwrap(), *size));
        }
        // Unwind in reverse order; each freed address is granted again for
        // the same request.
        for (addr, size) in addrs.into_iter().rev() {
            storage.free(addr).unwrap();
            prop_assert_eq!(storage.alloc(size).unwrap(), addr);
            storage.free(addr).unwrap();
        }
        prop_assert_eq!(storage.watermark(), 0);
    }

    #[test]
    fn block_roundtrips_arbitrary_spans((size, offset, data) in block_span_strategy()) {
        let storage = Storage::new(MemDevice::new(size));
        let block = Block::new(&storage, size).unwrap();

        block.write(offset, &data).unwrap();
        let mut back = vec![0u8; data.len()];
        block.read(offset, &mut back).unwrap();
        prop_assert_eq!(back, data);
    }
}
