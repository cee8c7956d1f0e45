//! Host-process helpers exposed to JIT'd code.
//!
//! A fixed table of C-ABI symbols: print/println plus list, map, and set
//! CRUD. Every parameter and return is a 64-bit float; collection handles
//! are opaque f64 ids into a process-wide table (small integers, exactly
//! representable). The symbol names are part of the external contract.
//!
//! Handles are never collected (`_free` just drops the table entry), and
//! map/set keys compare by f64 bit pattern.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, OnceLock};

use inkwell::context::Context;
use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::{Linkage, Module};
use inkwell::types::BasicMetadataTypeEnum;

#[derive(Default)]
struct Store {
    next_handle: u64,
    lists: HashMap<u64, Vec<f64>>,
    maps: HashMap<u64, HashMap<u64, f64>>,
    sets: HashMap<u64, HashSet<u64>>,
}

fn store() -> MutexGuard<'static, Store> {
    static STORE: OnceLock<Mutex<Store>> = OnceLock::new();
    STORE
        .get_or_init(|| {
            Mutex::new(Store {
                next_handle: 1,
                ..Store::default()
            })
        })
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn fresh_handle(store: &mut Store) -> u64 {
    let handle = store.next_handle;
    store.next_handle += 1;
    handle
}

/// `%g`-style rendering: shortest form at the given significant digits,
/// integral values without a decimal point.
fn format_sig(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rounded: f64 = format!("{:.*e}", digits - 1, value)
        .parse()
        .unwrap_or(value);
    format!("{}", rounded)
}

fn format_g(value: f64) -> String {
    format_sig(value, 6)
}

/// The `%.10g` rendering the driver uses to echo top-level values.
pub fn format_g10(value: f64) -> String {
    format_sig(value, 10)
}

// --- IO ---

#[no_mangle]
pub extern "C" fn fermat_print(value: f64) -> f64 {
    print!("{}", format_g(value));
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_println(value: f64) -> f64 {
    println!("{}", format_g(value));
    0.0
}

// --- List ---

#[no_mangle]
pub extern "C" fn fermat_list_create() -> f64 {
    let mut store = store();
    let handle = fresh_handle(&mut store);
    store.lists.insert(handle, Vec::new());
    handle as f64
}

#[no_mangle]
pub extern "C" fn fermat_list_free(handle: f64) -> f64 {
    store().lists.remove(&(handle as u64));
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_list_push(handle: f64, value: f64) -> f64 {
    if let Some(list) = store().lists.get_mut(&(handle as u64)) {
        list.push(value);
    }
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_list_get(handle: f64, index: f64) -> f64 {
    store()
        .lists
        .get(&(handle as u64))
        .and_then(|list| list.get(index as usize))
        .copied()
        .unwrap_or(0.0)
}

#[no_mangle]
pub extern "C" fn fermat_list_set(handle: f64, index: f64, value: f64) -> f64 {
    if let Some(list) = store().lists.get_mut(&(handle as u64)) {
        let index = index as usize;
        if index < list.len() {
            list[index] = value;
        }
    }
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_list_size(handle: f64) -> f64 {
    store()
        .lists
        .get(&(handle as u64))
        .map_or(0.0, |list| list.len() as f64)
}

// --- Map ---

#[no_mangle]
pub extern "C" fn fermat_map_create() -> f64 {
    let mut store = store();
    let handle = fresh_handle(&mut store);
    store.maps.insert(handle, HashMap::new());
    handle as f64
}

#[no_mangle]
pub extern "C" fn fermat_map_free(handle: f64) -> f64 {
    store().maps.remove(&(handle as u64));
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_map_put(handle: f64, key: f64, value: f64) -> f64 {
    if let Some(map) = store().maps.get_mut(&(handle as u64)) {
        map.insert(key.to_bits(), value);
    }
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_map_get(handle: f64, key: f64) -> f64 {
    store()
        .maps
        .get(&(handle as u64))
        .and_then(|map| map.get(&key.to_bits()))
        .copied()
        .unwrap_or(0.0)
}

#[no_mangle]
pub extern "C" fn fermat_map_check(handle: f64, key: f64) -> f64 {
    let present = store()
        .maps
        .get(&(handle as u64))
        .is_some_and(|map| map.contains_key(&key.to_bits()));
    if present {
        1.0
    } else {
        0.0
    }
}

#[no_mangle]
pub extern "C" fn fermat_map_size(handle: f64) -> f64 {
    store()
        .maps
        .get(&(handle as u64))
        .map_or(0.0, |map| map.len() as f64)
}

// --- Set ---

#[no_mangle]
pub extern "C" fn fermat_set_create() -> f64 {
    let mut store = store();
    let handle = fresh_handle(&mut store);
    store.sets.insert(handle, HashSet::new());
    handle as f64
}

#[no_mangle]
pub extern "C" fn fermat_set_free(handle: f64) -> f64 {
    store().sets.remove(&(handle as u64));
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_set_add(handle: f64, value: f64) -> f64 {
    if let Some(set) = store().sets.get_mut(&(handle as u64)) {
        set.insert(value.to_bits());
    }
    0.0
}

#[no_mangle]
pub extern "C" fn fermat_set_contains(handle: f64, value: f64) -> f64 {
    let present = store()
        .sets
        .get(&(handle as u64))
        .is_some_and(|set| set.contains(&value.to_bits()));
    if present {
        1.0
    } else {
        0.0
    }
}

#[no_mangle]
pub extern "C" fn fermat_set_size(handle: f64) -> f64 {
    store()
        .sets
        .get(&(handle as u64))
        .map_or(0.0, |set| set.len() as f64)
}

/// The stable symbol table: (name, arity, address).
fn symbols() -> Vec<(&'static str, usize, usize)> {
    vec![
        ("fermat_print", 1, fermat_print as usize),
        ("fermat_println", 1, fermat_println as usize),
        ("fermat_list_create", 0, fermat_list_create as usize),
        ("fermat_list_free", 1, fermat_list_free as usize),
        ("fermat_list_push", 2, fermat_list_push as usize),
        ("fermat_list_get", 2, fermat_list_get as usize),
        ("fermat_list_set", 3, fermat_list_set as usize),
        ("fermat_list_size", 1, fermat_list_size as usize),
        ("fermat_map_create", 0, fermat_map_create as usize),
        ("fermat_map_free", 1, fermat_map_free as usize),
        ("fermat_map_put", 3, fermat_map_put as usize),
        ("fermat_map_get", 2, fermat_map_get as usize),
        ("fermat_map_check", 2, fermat_map_check as usize),
        ("fermat_map_size", 1, fermat_map_size as usize),
        ("fermat_set_create", 0, fermat_set_create as usize),
        ("fermat_set_free", 1, fermat_set_free as usize),
        ("fermat_set_add", 2, fermat_set_add as usize),
        ("fermat_set_contains", 2, fermat_set_contains as usize),
        ("fermat_set_size", 1, fermat_set_size as usize),
    ]
}

/// Declares every runtime symbol in `module` and maps it to its host
/// address. Used once on the engine's bootstrap module.
pub fn install<'ctx>(context: &'ctx Context, engine: &ExecutionEngine<'ctx>, module: &Module<'ctx>) {
    let f64_type = context.f64_type();
    for (name, arity, address) in symbols() {
        let params: Vec<BasicMetadataTypeEnum> = vec![f64_type.into(); arity];
        let fn_type = f64_type.fn_type(&params, false);
        let function = module.add_function(name, fn_type, Some(Linkage::External));
        engine.add_global_mapping(&function, address);
    }
}

/// Maps any runtime symbols a committed module declared (via `extern`) to
/// their host addresses, so resolution never depends on the process export
/// table.
pub fn bind<'ctx>(engine: &ExecutionEngine<'ctx>, module: &Module<'ctx>) {
    for (name, _, address) in symbols() {
        if let Some(function) = module.get_function(name) {
            if function.count_basic_blocks() == 0 {
                engine.add_global_mapping(&function, address);
            }
        }
    }
}
