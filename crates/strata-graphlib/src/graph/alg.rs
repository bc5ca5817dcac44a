//! Traversal helpers over [`Graph`].
//!
//! All traversals use explicit stacks so deep graphs cannot overflow the call stack, and visit
//! neighbors in edge insertion order so results are reproducible.

use super::{Graph, HashMap, HashSet};

/// Depth-first preorder over successors, starting from each root in turn.
pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut visited: HashSet<&str> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for &root in roots {
        if !g.has_node(root) {
            continue;
        }
        let mut stack: Vec<&str> = vec![root];
        while let Some(v) = stack.pop() {
            if !visited.insert(v) {
                continue;
            }
            out.push(v.to_string());
            // Reverse so the first successor is visited first.
            stack.extend(g.successors(v).into_iter().rev());
        }
    }
    out
}

/// Depth-first postorder over successors, starting from each root in turn.
pub fn postorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut visited: HashSet<&str> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for &root in roots {
        if !g.has_node(root) || !visited.insert(root) {
            continue;
        }
        // Each frame holds a node and the successors it has yet to descend into.
        let mut stack: Vec<(&str, std::vec::IntoIter<&str>)> =
            vec![(root, g.successors(root).into_iter())];
        while let Some((v, pending)) = stack.last_mut() {
            match pending.next() {
                Some(w) => {
                    if visited.insert(w) {
                        stack.push((w, g.successors(w).into_iter()));
                    }
                }
                None => {
                    out.push(v.to_string());
                    stack.pop();
                }
            }
        }
    }
    out
}

/// Weakly connected components, each listed in discovery order.
pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut seen: HashSet<&str> = HashSet::default();
    let mut out: Vec<Vec<String>> = Vec::new();
    for start in g.nodes() {
        if !seen.insert(start) {
            continue;
        }
        let mut component: Vec<String> = Vec::new();
        let mut stack: Vec<&str> = vec![start];
        while let Some(v) = stack.pop() {
            component.push(v.to_string());
            for n in g.neighbors(v) {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        out.push(component);
    }
    out
}

/// Strongly connected components that contain a cycle (more than one node, or a self loop).
///
/// Members are listed in node insertion order and components are sorted by their first member's
/// insertion position.
pub fn find_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let ids: Vec<&str> = g.nodes().collect();
    let position: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let successors: Vec<Vec<usize>> = ids
        .iter()
        .map(|&v| {
            g.successors(v)
                .into_iter()
                .filter_map(|w| position.get(w).copied())
                .collect()
        })
        .collect();

    // Iterative Tarjan.
    const UNVISITED: usize = usize::MAX;
    let n = ids.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut scc_stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut sccs: Vec<Vec<usize>> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        scc_stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = call.last_mut() {
            let v = frame.0;
            if let Some(&w) = successors[v].get(frame.1) {
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    scc_stack.push(w);
                    on_stack[w] = true;
                    call.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                let mut scc: Vec<usize> = Vec::new();
                while let Some(w) = scc_stack.pop() {
                    on_stack[w] = false;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                sccs.push(scc);
            }
        }
    }

    let mut cycles: Vec<Vec<usize>> = sccs
        .into_iter()
        .filter(|scc| scc.len() > 1 || successors[scc[0]].contains(&scc[0]))
        .map(|mut scc| {
            scc.sort_unstable();
            scc
        })
        .collect();
    cycles.sort_by_key(|scc| scc[0]);
    cycles
        .into_iter()
        .map(|scc| scc.into_iter().map(|i| ids[i].to_string()).collect())
        .collect()
}

pub fn is_acyclic<N, E, G>(g: &Graph<N, E, G>) -> bool
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    find_cycles(g).is_empty()
}
