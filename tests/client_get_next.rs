//! Communicator tests against an in-process UDP agent.

mod common;

use std::time::Duration;

use common::{AgentMode, TestAgent, fixtures};
use mibwalk::{Communicator, Error, ErrorStatus, Transport, Value, oid};

async fn open(agent: &TestAgent, community: &str) -> Communicator {
    Communicator::open(
        "127.0.0.1",
        agent.port(),
        community.to_string(),
        Duration::from_millis(300),
    )
    .await
    .unwrap()
}

/// GetNext on a group returns its first instance.
#[tokio::test]
async fn get_next_returns_successor() {
    let agent = TestAgent::new().await;
    let comm = open(&agent, "public").await;

    let varbinds = comm.get_next(&fixtures::system_subtree()).await.unwrap();
    assert_eq!(varbinds.len(), 1);
    assert_eq!(varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
    assert_eq!(varbinds[0].value, Value::from("Test SNMP Agent"));
    assert_eq!(comm.peer_addr(), agent.addr());
}

/// Consecutive calls on one communicator each get their own answer.
#[tokio::test]
async fn get_next_steps_through_instances() {
    let agent = TestAgent::new().await;
    let comm = open(&agent, "public").await;

    let first = comm.get_next(&oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)).await.unwrap();
    let second = comm.get_next(&first[0].oid).await.unwrap();
    assert_eq!(first[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
    assert_eq!(first[0].value, Value::TimeTicks(123456));
    assert_eq!(second[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 4, 0));
    assert_eq!(agent.request_count(), 2);
}

/// Get returns the exact instance.
#[tokio::test]
async fn get_returns_instance() {
    let agent = TestAgent::new().await;
    let comm = open(&agent, "public").await;

    let varbinds = comm.get(&oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)).await.unwrap();
    assert_eq!(varbinds[0].value, Value::integer(72));
}

/// A missing instance comes back as an agent error naming it.
#[tokio::test]
async fn get_missing_instance_is_no_such_name() {
    let agent = TestAgent::new().await;
    let comm = open(&agent, "public").await;

    let missing = oid!(1, 3, 6, 1, 2, 1, 1, 99, 0);
    let err = comm.get(&missing).await.unwrap_err();
    match *err {
        Error::Agent {
            status,
            index,
            ref oid,
        } => {
            assert_eq!(status, ErrorStatus::NoSuchName);
            assert_eq!(index, 1);
            assert_eq!(oid.as_ref(), Some(&missing));
        }
        ref other => panic!("expected Agent, got {:?}", other),
    }
}

/// No answer within the timeout is NoResponse, after exactly one request.
#[tokio::test]
async fn silent_agent_is_no_response() {
    let agent = TestAgent::with_mode(fixtures::system_mib(), AgentMode::Silent).await;
    let comm = open(&agent, "public").await;

    let err = comm.get_next(&fixtures::system_subtree()).await.unwrap_err();
    match *err {
        Error::NoResponse { target, elapsed } => {
            assert_eq!(target, agent.addr());
            assert!(elapsed >= Duration::from_millis(250), "{:?}", elapsed);
        }
        ref other => panic!("expected NoResponse, got {:?}", other),
    }
    assert_eq!(agent.request_count(), 1);
}

/// A closed communicator refuses to send.
#[tokio::test]
async fn closed_communicator_fails_fast() {
    let agent = TestAgent::new().await;
    let comm = open(&agent, "public").await;

    comm.close();
    assert!(comm.transport().is_closed());

    let err = comm.get_next(&fixtures::system_subtree()).await.unwrap_err();
    assert!(matches!(*err, Error::Closed), "{:?}", err);
    assert_eq!(agent.request_count(), 0);
}
