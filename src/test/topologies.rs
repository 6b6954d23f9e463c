use crate::net::{NetWorld, NodeId, NodeRole, Vector2};
use crate::sim::SimTime;
use crate::topo::cluster::{BuildError, ClusterOpts, build_cluster};
use std::collections::HashSet;
use std::net::Ipv4Addr;

fn opts(groups: usize, per_group: usize) -> ClusterOpts {
    ClusterOpts {
        group_count: groups,
        nodes_per_group: per_group,
        ..ClusterOpts::default()
    }
}

#[test]
fn cluster_3x3_has_expected_nodes_and_links() {
    let mut world = NetWorld::default();
    let topo = build_cluster(&mut world, &opts(3, 3)).expect("build cluster");

    assert_eq!(world.net.node_count(), 12);
    assert_eq!(topo.link_count(), 21);
    assert_eq!(world.net.links().len(), 21);
    assert_eq!(topo.mesh_links.len(), 9);
    assert_eq!(topo.backbone_links.len(), 3);
    assert!(topo.spoke_links.iter().all(|s| s.len() == 3));

    let g1 = &topo.groups[1];
    assert_eq!(g1.members, vec![NodeId(4), NodeId(5), NodeId(6)]);
    assert_eq!(g1.head, NodeId(7));
    assert_eq!(world.net.node(g1.head).name(), "g1_head");
    assert_eq!(world.net.node(NodeId(4)).name(), "g1_m0");
    assert!(world.net.node(g1.head).role().is_head());
    assert_eq!(world.net.node(g1.head).role().group(), g1.id);
    // member: n-1 mesh interfaces + 1 spoke; head: n spokes + g-1 backbone
    assert_eq!(world.net.node(NodeId(4)).interfaces().len(), 3);
    assert_eq!(world.net.node(g1.head).interfaces().len(), 5);
    assert_eq!(
        world.net.node(NodeId(5)).role(),
        NodeRole::Member {
            group: g1.id,
            index: 1
        }
    );
}

#[test]
fn cluster_link_count_matches_closed_form() {
    for (g, n) in [(1, 1), (1, 4), (2, 2), (4, 3), (5, 5)] {
        let mut world = NetWorld::default();
        let o = opts(g, n);
        let topo = build_cluster(&mut world, &o).expect("build cluster");
        let expected = g * n * (n - 1) / 2 + g * (g - 1) / 2 + g * n;
        assert_eq!(topo.link_count(), expected, "g={g} n={n}");
        assert_eq!(o.link_count(), Some(expected));
        assert_eq!(world.net.node_count(), g * (n + 1));
    }
}

#[test]
fn cluster_addresses_follow_wiring_order() {
    let mut world = NetWorld::default();
    let topo = build_cluster(&mut world, &opts(3, 3)).expect("build cluster");
    let net = &world.net;

    // mesh (g0: m0-m1, m0-m2, m1-m2, ...) gets 10.0.1..=9, backbone 10..=12, spokes 13..=21
    let first_mesh = net.link(topo.mesh_links[0]).subnet.expect("subnet");
    assert_eq!(first_mesh.base, Ipv4Addr::new(10, 0, 1, 0));
    assert_eq!(net.node(NodeId(0)).addr_on(topo.mesh_links[0]), Some(Ipv4Addr::new(10, 0, 1, 1)));
    assert_eq!(net.node(NodeId(1)).addr_on(topo.mesh_links[0]), Some(Ipv4Addr::new(10, 0, 1, 2)));

    let first_backbone = net.link(topo.backbone_links[0]).subnet.expect("subnet");
    assert_eq!(first_backbone.base, Ipv4Addr::new(10, 0, 10, 0));

    assert_eq!(topo.member_address(net, 0, 0), Some(Ipv4Addr::new(10, 0, 13, 1)));
    assert_eq!(topo.member_address(net, 0, 2), Some(Ipv4Addr::new(10, 0, 15, 1)));
    assert_eq!(topo.member_address(net, 2, 2), Some(Ipv4Addr::new(10, 0, 21, 1)));
    assert_eq!(topo.member_address(net, 3, 0), None);
    assert_eq!(net.resolve(Ipv4Addr::new(10, 0, 13, 2)), Some(topo.groups[0].head));

    let bases: HashSet<_> = topo
        .links()
        .map(|l| net.link(l).subnet.expect("subnet").base)
        .collect();
    assert_eq!(bases.len(), 21);
}

#[test]
fn cluster_every_node_reaches_every_other_node() {
    let mut world = NetWorld::default();
    let topo = build_cluster(&mut world, &opts(3, 3)).expect("build cluster");
    let routing = world.net.routing();
    assert!(!routing.is_dirty());

    let nodes: Vec<_> = topo.nodes().collect();
    assert_eq!(nodes.len(), 12);
    for &a in &nodes {
        for &b in &nodes {
            let path = routing.path(a, b).expect("reachable");
            assert_eq!(path.first(), Some(&a));
            assert_eq!(path.last(), Some(&b));
        }
    }

    // g1 member -> g1 head -> g0 head -> g0 member
    let path = routing.path(NodeId(4), NodeId(0)).expect("path");
    assert_eq!(path, vec![NodeId(4), NodeId(7), NodeId(3), NodeId(0)]);
}

#[test]
fn cluster_rejects_bad_options_before_creating_anything() {
    let mut world = NetWorld::default();
    assert_eq!(build_cluster(&mut world, &opts(0, 3)).unwrap_err(), BuildError::ZeroGroups);
    assert_eq!(build_cluster(&mut world, &opts(3, 0)).unwrap_err(), BuildError::ZeroNodesPerGroup);

    let err = build_cluster(&mut world, &opts(1, 23)).unwrap_err();
    assert_eq!(
        err,
        BuildError::AddressSpaceExhausted {
            needed: 276,
            available: 255
        }
    );

    let bad_mask = ClusterOpts {
        subnet_mask: Ipv4Addr::new(255, 255, 0, 0),
        ..opts(2, 2)
    };
    assert!(matches!(
        build_cluster(&mut world, &bad_mask),
        Err(BuildError::InvalidMask(_))
    ));

    assert_eq!(world.net.node_count(), 0);
    assert!(world.net.links().is_empty());
}

#[test]
fn cluster_rejects_sizes_whose_link_count_overflows() {
    let huge = opts(3, 1usize << 33);
    assert_eq!(huge.link_count(), None);

    let mut world = NetWorld::default();
    assert_eq!(
        build_cluster(&mut world, &huge).unwrap_err(),
        BuildError::AddressSpaceExhausted {
            needed: usize::MAX,
            available: 255
        }
    );
    assert!(matches!(
        build_cluster(&mut world, &opts(usize::MAX, 2)),
        Err(BuildError::AddressSpaceExhausted { .. })
    ));
    assert_eq!(world.net.node_count(), 0);
}

#[test]
fn cluster_rejects_masks_without_room_for_both_link_ends() {
    for mask in [Ipv4Addr::new(255, 255, 255, 254), Ipv4Addr::new(255, 255, 255, 255)] {
        let mut world = NetWorld::default();
        let o = ClusterOpts {
            subnet_mask: mask,
            ..opts(2, 2)
        };
        assert_eq!(build_cluster(&mut world, &o).unwrap_err(), BuildError::InvalidMask(mask));
        assert_eq!(world.net.node_count(), 0);
    }

    let mut world = NetWorld::default();
    let o = ClusterOpts {
        subnet_mask: Ipv4Addr::new(255, 255, 255, 252),
        ..opts(2, 2)
    };
    let topo = build_cluster(&mut world, &o).expect("/30 fits both ends");
    for link in topo.links() {
        let subnet = world.net.link(link).subnet.expect("subnet");
        let l = world.net.link(link);
        for end in [l.a, l.b] {
            let addr = world.net.node(end).addr_on(link).expect("addr");
            assert!(subnet.contains(addr), "{addr} outside {subnet}");
        }
    }
}

#[test]
fn cluster_positions_without_mobility_follow_the_grid() {
    let mut world = NetWorld::default();
    let o = ClusterOpts {
        mobility: false,
        ..opts(3, 4)
    };
    let topo = build_cluster(&mut world, &o).expect("build cluster");
    let t = SimTime::from_secs(12);
    let net = &mut world.net;

    let g0 = &topo.groups[0];
    assert_eq!(net.position(g0.members[0], t), Vector2::new(10.0, 60.0));
    assert_eq!(net.position(g0.members[1], t), Vector2::new(20.0, 60.0));
    assert_eq!(net.position(g0.members[2], t), Vector2::new(30.0, 60.0));
    assert_eq!(net.position(g0.members[3], t), Vector2::new(10.0, 90.0));
    assert_eq!(net.position(topo.groups[1].members[0], t), Vector2::new(40.0, 60.0));

    let heads: Vec<_> = topo.heads().collect();
    assert_eq!(net.position(heads[0], t), Vector2::new(10.0, 10.0));
    assert_eq!(net.position(heads[1], t), Vector2::new(40.0, 15.0));
    assert_eq!(net.position(heads[2], t), Vector2::new(70.0, 10.0));
}

#[test]
fn cluster_members_walk_inside_their_column() {
    let mut world = NetWorld::default();
    let topo = build_cluster(&mut world, &opts(3, 3)).expect("build cluster");

    for step in 0..=120 {
        let t = SimTime::from_millis(step * 250);
        for (c, g) in topo.groups.iter().enumerate() {
            let x0 = 10.0 + 30.0 * c as f64;
            for &m in &g.members {
                let p = world.net.position(m, t);
                assert!(p.x >= x0 && p.x <= x0 + 30.0, "x={} out of column {c}", p.x);
                assert!(p.y >= -100.0 && p.y <= 100.0, "y={} out of bounds", p.y);
            }
        }
    }
}
