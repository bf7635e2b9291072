//! Program-model fixtures.

use unitscan_core::{
    Annotation, Program, TypeDescriptor, TypeRef, Unit, UnitBuilder, UnitId,
    DEFAULT_OPT_IN_MARKER,
};

/// Start a unit that carries the default opt-in marker.
pub fn marked_unit(id: &UnitId) -> UnitBuilder {
    Unit::builder(id.clone()).annotated(Annotation::new(DEFAULT_OPT_IN_MARKER))
}

/// The canonical derivation scenario.
///
/// Root `Shapes@1.0.0` declares `Shape`, `Circle : Shape`, `Square : Shape`
/// and abstract `Polygon : Shape`. It depends on `Vendor.Shapes@2.0.0`,
/// which declares `Triangle : Shape` but does not carry the opt-in marker.
pub struct ShapesFixture {
    pub program: Program,
    pub root: UnitId,
    pub vendor: UnitId,
    pub shape: TypeRef,
    pub circle: TypeRef,
    pub square: TypeRef,
    pub polygon: TypeRef,
    pub triangle: TypeRef,
}

pub fn shapes_fixture() -> ShapesFixture {
    let root = UnitId::new("Shapes", "1.0.0");
    let vendor = UnitId::new("Vendor.Shapes", "2.0.0");

    let shape = TypeDescriptor::builder(&root, "Geometry", "Shape").build();
    let circle = TypeDescriptor::builder(&root, "Geometry", "Circle")
        .base(shape.clone())
        .build();
    let square = TypeDescriptor::builder(&root, "Geometry", "Square")
        .base(shape.clone())
        .build();
    let polygon = TypeDescriptor::builder(&root, "Geometry", "Polygon")
        .base(shape.clone())
        .abstract_()
        .build();
    let triangle = TypeDescriptor::builder(&vendor, "Vendor.Geometry", "Triangle")
        .base(shape.clone())
        .build();

    let program = Program::new()
        .with_unit(
            Unit::builder(root.clone())
                .depends_on(vendor.clone())
                .with_type(shape.clone())
                .with_type(circle.clone())
                .with_type(square.clone())
                .with_type(polygon.clone())
                .build(),
        )
        .with_unit(
            Unit::builder(vendor.clone())
                .with_type(triangle.clone())
                .build(),
        );

    ShapesFixture {
        program,
        root,
        vendor,
        shape,
        circle,
        square,
        polygon,
        triangle,
    }
}

/// A service application spread over several units.
///
/// ```text
/// App ──> Services (opted in) ──> Core (opted in)
///  │          └──────────────────> App   (cycle)
///  └────> Closed (not opted in)
/// ```
///
/// `Core` declares `Core.ServiceAttribute`, `Core.IRepository` and
/// `Core.RepositoryBase : IRepository` (abstract). Services annotated with
/// `ServiceAttribute` live in every unit; `Closed` must never contribute.
pub struct LayeredFixture {
    pub program: Program,
    pub app: UnitId,
    pub services: UnitId,
    pub core: UnitId,
    pub closed: UnitId,
    pub service_attribute: TypeRef,
    pub repository: TypeRef,
}

pub fn layered_fixture() -> LayeredFixture {
    let app = UnitId::new("App", "1.0.0");
    let services = UnitId::new("App.Services", "1.0.0");
    let core = UnitId::new("App.Core", "1.0.0");
    let closed = UnitId::new("Closed.Library", "3.1.0");

    let service_attribute = TypeDescriptor::builder(&core, "Core", "ServiceAttribute").build();
    let repository = TypeDescriptor::builder(&core, "Core", "IRepository")
        .interface()
        .build();
    let repository_base = TypeDescriptor::builder(&core, "Core", "RepositoryBase")
        .implements(repository.clone())
        .abstract_()
        .build();
    let clock = TypeDescriptor::builder(&core, "Core", "SystemClock")
        .annotated(Annotation::new("Core.ServiceAttribute"))
        .build();

    let user_repository = TypeDescriptor::builder(&services, "Services.Data", "UserRepository")
        .base(repository_base.clone())
        .annotated(Annotation::new("Core.ServiceAttribute"))
        .build();
    let options = TypeDescriptor::builder(&services, "Services", "Options")
        .within("Mailer")
        .annotated(Annotation::new("Core.ServiceAttribute"))
        .build();
    let mailer = TypeDescriptor::builder(&services, "Services", "Mailer")
        .annotated(Annotation::new("Core.Service"))
        .nested(options)
        .build();

    let controller = TypeDescriptor::builder(&app, "App", "HomeController")
        .annotated(Annotation::new("Core.ServiceAttribute").with_argument("Scoped"))
        .build();
    let order_repository = TypeDescriptor::builder(&app, "App.Data", "OrderRepository")
        .implements(repository.clone())
        .build();

    let hidden = TypeDescriptor::builder(&closed, "Closed", "HiddenService")
        .annotated(Annotation::new("Core.ServiceAttribute"))
        .implements(repository.clone())
        .build();

    let program = Program::new()
        .with_unit(
            Unit::builder(app.clone())
                .depends_on(services.clone())
                .depends_on(closed.clone())
                .with_type(controller)
                .with_type(order_repository)
                .build(),
        )
        .with_unit(
            marked_unit(&services)
                .depends_on(core.clone())
                .depends_on(app.clone())
                .with_type(user_repository)
                .with_type(mailer)
                .build(),
        )
        .with_unit(
            marked_unit(&core)
                .with_type(service_attribute.clone())
                .with_type(repository.clone())
                .with_type(repository_base)
                .with_type(clock)
                .build(),
        )
        .with_unit(Unit::builder(closed.clone()).with_type(hidden).build());

    LayeredFixture {
        program,
        app,
        services,
        core,
        closed,
        service_attribute,
        repository,
    }
}

/// Two opted-in units referencing each other, one type each.
pub fn cycle_fixture() -> (Program, UnitId, UnitId) {
    let a = UnitId::unversioned("A");
    let b = UnitId::unversioned("B");

    let program = Program::new()
        .with_unit(
            marked_unit(&a)
                .depends_on(b.clone())
                .with_type(TypeDescriptor::builder(&a, "A", "Alpha").build())
                .build(),
        )
        .with_unit(
            marked_unit(&b)
                .depends_on(a.clone())
                .with_type(TypeDescriptor::builder(&b, "B", "Beta").build())
                .build(),
        );

    (program, a, b)
}

/// Shape of one unit in a generated graph.
#[derive(Debug, Clone)]
pub struct UnitSpec {
    pub opted_in: bool,
    /// Indices of dependencies; out-of-range indices are dropped.
    pub dependencies: Vec<usize>,
    pub type_count: usize,
}

/// Build a program from unit specs. Unit `i` is named `U{i}` and declares
/// types `U{i}.T{j}`. Returns the ids in input order.
pub fn build_graph(specs: &[UnitSpec]) -> (Program, Vec<UnitId>) {
    let ids: Vec<UnitId> = (0..specs.len())
        .map(|i| UnitId::new(format!("U{i}"), "1.0.0"))
        .collect();

    let mut program = Program::new();
    for (spec, id) in specs.iter().zip(&ids) {
        let mut builder = if spec.opted_in {
            marked_unit(id)
        } else {
            Unit::builder(id.clone())
        };
        for &dependency in &spec.dependencies {
            if let Some(target) = ids.get(dependency) {
                builder = builder.depends_on(target.clone());
            }
        }
        for j in 0..spec.type_count {
            builder = builder.with_type(
                TypeDescriptor::builder(id, id.name(), &format!("T{j}")).build(),
            );
        }
        program.insert(builder.build());
    }

    (program, ids)
}

/// A linear chain `U0 -> U1 -> ... -> U{len-1}` of opted-in units.
pub fn chain_fixture(len: usize, types_per_unit: usize) -> (Program, UnitId) {
    let specs: Vec<UnitSpec> = (0..len)
        .map(|i| UnitSpec {
            opted_in: true,
            dependencies: vec![i + 1],
            type_count: types_per_unit,
        })
        .collect();
    let (program, ids) = build_graph(&specs);
    let root = ids
        .into_iter()
        .next()
        .unwrap_or_else(|| UnitId::unversioned("U0"));
    (program, root)
}
