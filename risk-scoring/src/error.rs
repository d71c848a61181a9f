use error_chain::error_chain;

error_chain! {
    foreign_links {
        Io(std::io::Error);
        Csv(csv::Error);
    }

    errors {
        /// A service-life table without any usable rows.
        EmptyServiceLifeTable(path: String) {
            description("the service-life table contains no usable rows")
            display("the service-life table '{}' contains no usable rows", path)
        }
    }
}
