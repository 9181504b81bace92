//! Crate-level integration and BDD tests.

use crate::activation::activate;
use crate::contract::RunOptions;
use crate::registry::PluginRegistry;
use crate::stages::output_filter::apply_filter;

pub(crate) mod support;


use support::{VirtualCodebase, sample_discoverer};

#[test]
fn end_to_end_load_activate_and_write() {
    let mut registry = PluginRegistry::with_default_stages();
    let loaded = registry
        .load_plugins(&sample_discoverer())
        .expect("load plugins");
    let options = RunOptions::new()
        .with("exclude_tests", true)
        .with("json_lines", "-")
        .with("strip_root", true);
    let mut active = activate(&loaded.plugins(), &options).expect("activate");

    let mut codebase = VirtualCodebase::from_paths(&["root", "root/lib.rs", "root/tests/it.rs"]);
    for plugin in &mut active {
        if let Some(filter) = plugin.instance_mut().as_output_filter_mut() {
            apply_filter(filter, &mut codebase, &options).expect("filter");
        }
    }

    let mut sink = Vec::new();
    for plugin in &mut active {
        if let Some(output) = plugin.instance_mut().as_output_mut() {
            output
                .process_codebase(&codebase, &mut sink, &options)
                .expect("write output");
        }
    }
    let text = String::from_utf8(sink).expect("utf-8 output");
    assert_eq!(text.lines().collect::<Vec<_>>().len(), 1);
    assert!(text.contains("root/lib.rs"));
}
