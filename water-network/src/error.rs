use error_chain::error_chain;

error_chain! {
    links {
        // For some weird reasons I don't understand, the doc comments have to be put after the item in this macro...
        LayerIoError(crate::io::layers::Error, crate::io::layers::ErrorKind)
        /// A wrapper for errors thrown by feature-layer IO.
        ;
    }

    errors {
        /// A pipe segment whose geometry has fewer than two coordinates.
        DegenerateSegment(facility_id: String) {
            description("a pipe segment has a degenerate geometry")
            display("pipe segment '{}' has fewer than two coordinates", facility_id)
        }

        /// Two pipe segments sharing the same facility identifier.
        DuplicateFacilityId(facility_id: String) {
            description("duplicate facility identifier")
            display("duplicate facility identifier: '{}'", facility_id)
        }

        /// A trace was started from a seed whose segment is not in the network.
        TraceStartUnknown(facility_id: String) {
            description("trace start point does not belong to the network")
            display(
                "trace start point '{}' does not belong to any segment of the network",
                facility_id
            )
        }
    }
}
