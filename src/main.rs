use apgov::utils::logger;
use apgov::utils::metrics::format_joules;
use apgov::{
    Governor, MockTelemetry, NvidiaSmiTelemetry, SoftwareRuntime, TelemetrySource,
    WorkloadDescriptor, run_governed,
};
use log::info;

fn main() {
    logger::setup_logger();
    info!("Application started");

    info!(
        "NVIDIA telemetry available: {}",
        NvidiaSmiTelemetry::is_available()
    );

    // Demo against the synthetic telemetry source so the walkthrough
    // works on machines without a GPU.
    let telemetry = MockTelemetry::new().with_jitter(3.0);
    let mut governor = Governor::new(telemetry, SoftwareRuntime::new()).unwrap();

    let prompts = [
        "add two small 2x2 matrices",
        "run inference with batch_size=8 on a 512x512 model",
        "train deep neural network on 4096x4096 batch_size=32",
    ];

    for prompt in prompts {
        let descriptor = WorkloadDescriptor::Text(prompt.to_string());
        let (_, saved) = run_governed(&mut governor, &descriptor, || {
            std::thread::sleep(std::time::Duration::from_millis(50));
        });
        let record = governor.history().last().unwrap();
        info!(
            "\"{prompt}\" -> complexity {:.2}, tier {}, {} saved",
            record.complexity,
            record.tier,
            format_joules(saved, 1)
        );
        for (metric, value) in governor.formatted_metrics() {
            info!("  {metric}: {value}");
        }
    }

    let summary = governor.history_summary();
    info!(
        "Ran {} optimizations, average complexity {:.2}, total {}",
        summary.total_optimizations,
        summary.average_complexity,
        format_joules(summary.total_energy_saved, 1)
    );

    let energy = governor.energy_summary();
    info!(
        "Average savings: {:.1}% power, {:.1}% memory",
        energy.avg_power_saved_percent, energy.avg_memory_saved_percent
    );

    info!("History:\n{:?}", governor.history().to_dataframe().unwrap());

    governor.reset();
    info!("Program ended successfully.");
}
