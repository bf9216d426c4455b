//! Standard test fixtures with realistic MIB data.

use std::collections::BTreeMap;
use std::sync::Arc;

use mibwalk::mib::{Access, MibObject, MibObjectDef, MibSyntax, MibTreeBuilder};
use mibwalk::{MibTree, Oid, Value, oid};

/// The system group (1.3.6.1.2.1.1).
///
/// - sysDescr.0 (1.3.6.1.2.1.1.1.0)
/// - sysObjectID.0 (1.3.6.1.2.1.1.2.0)
/// - sysUpTime.0 (1.3.6.1.2.1.1.3.0)
/// - sysContact.0 (1.3.6.1.2.1.1.4.0)
/// - sysName.0 (1.3.6.1.2.1.1.5.0)
/// - sysLocation.0 (1.3.6.1.2.1.1.6.0)
/// - sysServices.0 (1.3.6.1.2.1.1.7.0)
pub fn system_mib() -> BTreeMap<Oid, Value> {
    let mut data = BTreeMap::new();
    data.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Test SNMP Agent"));
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 2, 0),
        Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 99999)),
    );
    data.insert(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(123456));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 1, 4, 0), Value::from("admin@test.local"));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("test-agent"));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 1, 6, 0), Value::from("Test Lab"));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 1, 7, 0), Value::integer(72));
    data
}

/// ifNumber plus `count` rows of ifIndex, ifDescr and ifOperStatus.
///
/// Odd rows are up(1), even rows down(2).
pub fn interface_table(count: u32) -> BTreeMap<Oid, Value> {
    let mut data = BTreeMap::new();
    data.insert(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::integer(count));
    for i in 1..=count {
        data.insert(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, i), Value::integer(i));
        data.insert(
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, i),
            Value::from(format!("eth{}", i - 1)),
        );
        data.insert(
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, i),
            Value::integer(if i % 2 == 1 { 1 } else { 2 }),
        );
    }
    data
}

pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Tree with the system group and part of the interfaces group.
pub fn mib_tree() -> Arc<MibTree> {
    let read_only = |name: &str, subid: u32| {
        MibObject::new(name, subid)
            .access(Access::ReadOnly)
            .mib("RFC1213-MIB")
    };

    let mut builder = MibTreeBuilder::with_standard_roots();
    builder
        .define(MibObjectDef::under("mib-2", MibObject::new("system", 1)))
        .define(MibObjectDef::under("system", read_only("sysDescr", 1)))
        .define(MibObjectDef::under("system", read_only("sysObjectID", 2)))
        .define(MibObjectDef::under("system", read_only("sysUpTime", 3)))
        .define(MibObjectDef::under("system", read_only("sysContact", 4)))
        .define(MibObjectDef::under("system", read_only("sysName", 5)))
        .define(MibObjectDef::under("system", read_only("sysLocation", 6)))
        .define(MibObjectDef::under("system", read_only("sysServices", 7)))
        .define(MibObjectDef::under("mib-2", MibObject::new("interfaces", 2)))
        .define(MibObjectDef::under("interfaces", read_only("ifNumber", 1)))
        .define(MibObjectDef::under("interfaces", MibObject::new("ifTable", 2)))
        .define(MibObjectDef::under("ifTable", MibObject::new("ifEntry", 1)))
        .define(MibObjectDef::under("ifEntry", read_only("ifIndex", 1)))
        .define(MibObjectDef::under("ifEntry", read_only("ifDescr", 2)))
        .define(MibObjectDef::under(
            "ifEntry",
            read_only("ifOperStatus", 8).syntax(
                MibSyntax::new("INTEGER")
                    .value(1, "up")
                    .value(2, "down")
                    .value(3, "testing"),
            ),
        ));
    Arc::new(builder.build().expect("fixture tree"))
}
