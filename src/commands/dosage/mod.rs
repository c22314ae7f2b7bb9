use crate::{
    cli::DosageArgs,
    core::{dispatcher::Dispatcher, field::Schema, registry::MethodRegistry},
    io::{table_writer::DosageWriter, vcf_reader::VcfReader},
    utils::util::Result,
};


pub fn dosage(args: DosageArgs) -> Result<()> {
    let mut reader = VcfReader::new(args.input.as_deref(), args.num_threads)?;
    let samples = reader.header().sample_names();

    let registry = MethodRegistry::resolve(reader.header(), &args.tags)?;
    if registry.is_empty() {
        log::warn!(
            "None of the requested tags ({}) can be used, every polymorphic record will be reported as -1.0",
            args.tags.join(",")
        );
    } else {
        log::info!("Dosage sources in order: {}", registry.tags().join(", "));
    }

    let mut writer = DosageWriter::new(args.output.as_deref())?;
    writer.write_header(&samples)?;
    if args.print_header {
        return writer.finish();
    }

    let mut dispatcher = Dispatcher::new(registry);
    while reader.advance()? {
        let row = dispatcher.process(&reader.current_record)?;
        writer.write_row(&row)?;
    }
    log::debug!("Wrote {} rows", writer.n_rows());
    writer.finish()?;

    dispatcher.summary().log();
    Ok(())
}
