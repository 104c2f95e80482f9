use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{bounded, RecvTimeoutError};
use handoff::errors::{Error, Result};
use handoff::BoundedQueue;

type R = Result<()>;

const BLOCKED: Duration = Duration::from_millis(150);

#[test]
fn test_send_receive() -> R {
    let queue = BoundedQueue::new(1);
    queue.send("Hello, World!")?;
    assert_eq!(queue.recv(), Some("Hello, World!"));
    assert!(queue.is_empty());
    Ok(())
}

#[test]
fn test_buffered_fifo() -> R {
    let queue = BoundedQueue::new(3);
    for i in 1..=3 {
        queue.send(i)?;
    }
    assert_eq!(queue.len(), 3);

    for i in 1..=3 {
        assert_eq!(queue.recv(), Some(i));
    }
    assert!(queue.is_empty());
    Ok(())
}

#[test]
fn test_rendezvous() {
    // -----------------------------------------------------------------------------
    // 		- Zero capacity hand-off -
    // 		The receiver blocks first, the sender hands the value over
    // 		and nothing is left behind in the queue
    // -----------------------------------------------------------------------------
    let queue = Arc::new(BoundedQueue::new(0));
    let rx = queue.clone();
    let receiver = thread::spawn(move || rx.recv());

    thread::sleep(Duration::from_millis(50));

    let tx = queue.clone();
    let sender = thread::spawn(move || tx.send(7));

    assert!(sender.join().unwrap().is_ok());
    assert_eq!(receiver.join().unwrap(), Some(7));
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_rendezvous_send_waits_for_receiver() {
    let queue = Arc::new(BoundedQueue::new(0));

    let (done_tx, done_rx) = bounded(1);
    let tx = queue.clone();
    thread::spawn(move || {
        let res = tx.send("unbuffered");
        let _ = done_tx.send(res.is_ok());
    });

    assert_eq!(done_rx.recv_timeout(BLOCKED), Err(RecvTimeoutError::Timeout));
    assert!(queue.is_empty());

    assert_eq!(queue.recv(), Some("unbuffered"));
    assert_eq!(done_rx.recv(), Ok(true));
    assert!(queue.is_empty());
}

#[test]
fn test_full_queue_blocks_sender() -> R {
    let queue = Arc::new(BoundedQueue::new(2));
    queue.send(1)?;
    queue.send(2)?;

    let (done_tx, done_rx) = bounded(1);
    let tx = queue.clone();
    thread::spawn(move || {
        let res = tx.send(3);
        let _ = done_tx.send(res.is_ok());
    });

    assert_eq!(done_rx.recv_timeout(BLOCKED), Err(RecvTimeoutError::Timeout));
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.recv(), Some(1));
    assert_eq!(done_rx.recv(), Ok(true));

    assert_eq!(queue.recv(), Some(2));
    assert_eq!(queue.recv(), Some(3));
    Ok(())
}

#[test]
fn test_producers_and_consumers() {
    // -----------------------------------------------------------------------------
    // 		- Three producers, two consumers -
    // 		Every value arrives exactly once and each producer's values
    // 		arrive in the order they were sent
    // -----------------------------------------------------------------------------
    let queue = Arc::new(BoundedQueue::new(5));
    let producers = 3;
    let per_producer = 200;
    let consumers = 2;
    let per_consumer = producers * per_producer / consumers;

    let mut producer_handles = Vec::new();
    for id in 0..producers {
        let tx = queue.clone();
        producer_handles.push(thread::spawn(move || {
            for seq in 0..per_producer {
                tx.send((id, seq)).unwrap();
            }
        }));
    }

    let mut consumer_handles = Vec::new();
    for _ in 0..consumers {
        let rx = queue.clone();
        consumer_handles.push(thread::spawn(move || {
            (0..per_consumer).map(|_| rx.recv().unwrap()).collect::<Vec<_>>()
        }));
    }

    for handle in producer_handles {
        handle.join().unwrap();
    }

    let mut received = Vec::new();
    for handle in consumer_handles {
        let values = handle.join().unwrap();
        // A single consumer sees each producer's values in order
        for id in 0..producers {
            let seqs = values.iter().filter(|(p, _)| *p == id).map(|(_, s)| *s).collect::<Vec<_>>();
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }
        received.extend(values);
    }

    assert_eq!(received.len(), producers * per_producer);
    received.sort();
    received.dedup();
    assert_eq!(received.len(), producers * per_producer);
    assert!(queue.is_empty());
}

#[test]
fn test_close() -> R {
    let queue = BoundedQueue::new(2);
    queue.send("Message 1")?;
    queue.send("Message 2")?;

    queue.close()?;
    assert!(queue.is_closed());

    assert!(matches!(queue.send("Message 3"), Err(Error::ClosedQueueSend)));

    // End of stream is reported as soon as the queue is closed
    assert_eq!(queue.recv(), None);
    assert_eq!(queue.len(), 2);

    assert!(matches!(queue.close(), Err(Error::AlreadyClosed)));
    assert!(queue.is_closed());
    assert_eq!(queue.len(), 2);
    Ok(())
}

#[test]
fn test_close_fails_blocked_sender() -> R {
    let queue = Arc::new(BoundedQueue::new(1));
    queue.send(1)?;

    let tx = queue.clone();
    let sender = thread::spawn(move || tx.send(2));

    thread::sleep(Duration::from_millis(50));
    queue.close()?;

    assert!(matches!(sender.join().unwrap(), Err(Error::ClosedQueueSend)));
    assert_eq!(queue.len(), 1);
    Ok(())
}

#[test]
fn test_close_wakes_waiting_receiver() -> R {
    let queue = Arc::new(BoundedQueue::<u32>::new(0));

    let rx = queue.clone();
    let receiver = thread::spawn(move || rx.recv());

    thread::sleep(Duration::from_millis(50));
    queue.close()?;

    assert_eq!(receiver.join().unwrap(), None);
    Ok(())
}

#[test]
fn test_iter_until_closed() {
    let queue = Arc::new(BoundedQueue::new(0));

    let tx = queue.clone();
    let producer = thread::spawn(move || {
        for i in 0..5 {
            tx.send(i).unwrap();
        }
        tx.close().unwrap();
    });

    let received = queue.iter().collect::<Vec<_>>();
    producer.join().unwrap();

    assert_eq!(received, vec![0, 1, 2, 3, 4]);
}
