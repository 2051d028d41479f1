//! Sample schema: projects, their users and the users' tasks
//!
//! Backs the `orm-relay-demo` binary. Every connection reads from a
//! [`MemorySource`], so the same schema is used to exercise the resolvers
//! end to end.

use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Object, Schema, SchemaError, TypeRef,
};
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::connection::{ConnectionOutput, Edge};
use crate::filter::WhereClause;
use crate::graphql::{
    NodeTypeMapper, TypeCache, connection_definitions, connection_field, node_field, node_object,
    register_node_interface,
};
use crate::memory::MemorySource;
use crate::order::{OrderBy, OrderEnum};
use crate::resolver::ConnectionResolver;
use crate::source::{Record, Target};

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub done: bool,
    pub priority: i64,
}

impl Record for Project {
    fn identifier(&self) -> String {
        self.id.to_string()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }
}

impl Record for User {
    fn identifier(&self) -> String {
        self.id.to_string()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "project_id" => Some(self.project_id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            _ => None,
        }
    }
}

impl Record for Task {
    fn identifier(&self) -> String {
        self.id.to_string()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "user_id" => Some(self.user_id.into()),
            "title" => Some(self.title.clone().into()),
            "done" => Some(self.done.into()),
            "priority" => Some(self.priority.into()),
            _ => None,
        }
    }
}

/// One in-memory source per connection field.
pub struct Stores {
    pub projects: Arc<MemorySource<(), Project>>,
    pub users: Arc<MemorySource<(), User>>,
    pub project_users: Arc<MemorySource<Project, User>>,
    pub user_tasks: Arc<MemorySource<User, Task>>,
}

impl Stores {
    pub fn new(projects: Vec<Project>, users: Vec<User>, tasks: Vec<Task>) -> Self {
        Self {
            projects: Arc::new(MemorySource::new(projects)),
            users: Arc::new(MemorySource::new(users.clone())),
            project_users: Arc::new(
                MemorySource::new(users)
                    .with_scope(|project: &Project, user: &User| user.project_id == project.id),
            ),
            user_tasks: Arc::new(
                MemorySource::new(tasks).with_scope(|user: &User, task: &Task| task.user_id == user.id),
            ),
        }
    }

    pub fn sample() -> Self {
        let projects = vec![
            Project { id: 1, name: "Compiler".into() },
            Project { id: 2, name: "Website".into() },
        ];
        let users = [
            (1, 1, "Ada"),
            (2, 1, "Grace"),
            (3, 2, "Linus"),
            (4, 1, "Barbara"),
            (5, 2, "Ken"),
        ]
        .into_iter()
        .map(|(id, project_id, name)| User {
            id,
            project_id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        })
        .collect();
        let tasks = [
            (1, 1, "Write parser", true, 3),
            (2, 1, "Write lexer", true, 2),
            (3, 1, "Type checker", false, 5),
            (4, 1, "Code generation", false, 4),
            (5, 2, "Debugger", false, 1),
            (6, 3, "Landing page", true, 2),
            (7, 1, "Optimizer", false, 1),
        ]
        .into_iter()
        .map(|(id, user_id, title, done, priority)| Task {
            id,
            user_id,
            title: title.to_string(),
            done,
            priority,
        })
        .collect();
        Self::new(projects, users, tasks)
    }
}

/// Map GraphQL filter arguments onto column names.
fn column_filter(key: &str, value: &Value, _accumulated: &WhereClause) -> WhereClause {
    let mut fragment = WhereClause::new();
    match key {
        "projectId" => {
            fragment.insert("project_id".to_string(), value.clone());
        }
        "minPriority" => {
            fragment.insert("priority".to_string(), serde_json::json!({ "gte": value }));
        }
        other => {
            fragment.insert(other.to_string(), value.clone());
        }
    }
    fragment
}

fn attribute_field<N: Record + 'static>(name: &str, attribute: &'static str, ty: TypeRef) -> Field {
    Field::new(name, ty, move |ctx| {
        FieldFuture::new(async move {
            let node = ctx.parent_value.try_downcast_ref::<N>()?;
            match node.attribute(attribute) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => Ok(Some(FieldValue::value(async_graphql::Value::from_json(value)?))),
            }
        })
    })
}

/// Build the sample schema over `stores`.
pub fn build_schema(stores: &Stores, config: &ConnectionConfig) -> Result<Schema, SchemaError> {
    let projects = Arc::new(
        ConnectionResolver::<(), Project>::new(
            Target::model("Project", "id").with_attributes(["id", "name"]),
            stores.projects.clone(),
        )
        .with_config(config.clone()),
    );
    let users = Arc::new(
        ConnectionResolver::<(), User>::new(
            Target::model("User", "id").with_attributes(["id", "project_id", "name", "email"]),
            stores.users.clone(),
        )
        .with_order_enum(OrderEnum::primary_key("User", "id").value("NAME", OrderBy::asc("name")))
        .with_filter(column_filter)
        .with_config(config.clone()),
    );
    let project_users = Arc::new(
        ConnectionResolver::<Project, User>::new(
            Target::association("users", "User", "id")
                .with_attributes(["id", "project_id", "name", "email"]),
            stores.project_users.clone(),
        )
        .with_order_enum(
            OrderEnum::primary_key("ProjectUsers", "id").value("NAME", OrderBy::asc("name")),
        )
        .with_config(config.clone()),
    );
    let user_tasks = Arc::new(
        ConnectionResolver::<User, Task>::new(
            Target::association("tasks", "Task", "id")
                .with_attributes(["id", "user_id", "title", "done", "priority"]),
            stores.user_tasks.clone(),
        )
        .with_order_enum(
            OrderEnum::primary_key("UserTasks", "id")
                .value("PRIORITY_DESC", OrderBy::desc("priority"))
                .value("TITLE", OrderBy::asc("title")),
        )
        .with_filter(column_filter)
        .with_config(config.clone()),
    );

    let nodes = Arc::new(
        NodeTypeMapper::new()
            .map_type::<Project>("Project", stores.projects.clone())
            .map_type::<User>("User", stores.users.clone())
            .map_type::<Task>("Task", stores.user_tasks.clone()),
    );

    let mut cache = TypeCache::new();
    let builder = register_node_interface(&mut cache, Schema::build("Query", None, None));
    let builder = connection_definitions::<Project, ()>(
        "Project",
        "Project",
        projects.order_enum().clone(),
    )
    .register(&mut cache, builder);
    let builder = connection_definitions::<User, ()>("User", "User", users.order_enum().clone())
        .connection_field(Field::new(
            "appliedFilter",
            TypeRef::named_nn(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let output = ctx
                        .parent_value
                        .try_downcast_ref::<ConnectionOutput<User, ()>>()?;
                    let filter = Value::Object(output.descriptor().filter.clone());
                    Ok(Some(FieldValue::value(filter.to_string())))
                })
            },
        ))
        .edge_field(Field::new(
            "position",
            TypeRef::named_nn(TypeRef::INT),
            |ctx| {
                FieldFuture::new(async move {
                    let edge = ctx.parent_value.try_downcast_ref::<Edge<User>>()?;
                    let position = edge.cursor.decode()?;
                    Ok(Some(FieldValue::value(position.window_index)))
                })
            },
        ))
        .register(&mut cache, builder);
    let builder = connection_definitions::<User, Project>(
        "ProjectUsers",
        "User",
        project_users.order_enum().clone(),
    )
    .register(&mut cache, builder);
    let builder = connection_definitions::<Task, User>(
        "UserTasks",
        "Task",
        user_tasks.order_enum().clone(),
    )
    .register(&mut cache, builder);

    let project = node_object::<Project>("Project")
        .field(attribute_field::<Project>("name", "name", TypeRef::named_nn(TypeRef::STRING)))
        .field(connection_field("users", "ProjectUsers", project_users, std::iter::empty()));

    let user = node_object::<User>("User")
        .field(attribute_field::<User>("name", "name", TypeRef::named_nn(TypeRef::STRING)))
        .field(attribute_field::<User>("email", "email", TypeRef::named_nn(TypeRef::STRING)))
        .field(connection_field(
            "tasks",
            "UserTasks",
            user_tasks,
            [
                InputValue::new("done", TypeRef::named(TypeRef::BOOLEAN)),
                InputValue::new("minPriority", TypeRef::named(TypeRef::INT)),
            ],
        ));

    let task = node_object::<Task>("Task")
        .field(attribute_field::<Task>("title", "title", TypeRef::named_nn(TypeRef::STRING)))
        .field(attribute_field::<Task>("done", "done", TypeRef::named_nn(TypeRef::BOOLEAN)))
        .field(attribute_field::<Task>("priority", "priority", TypeRef::named_nn(TypeRef::INT)));

    let query = Object::new("Query")
        .field(node_field(nodes))
        .field(connection_field("projects", "Project", projects, std::iter::empty()))
        .field(connection_field(
            "users",
            "User",
            users,
            [
                InputValue::new("name", TypeRef::named(TypeRef::STRING)),
                InputValue::new("projectId", TypeRef::named(TypeRef::INT)),
            ],
        ));

    builder
        .register(project)
        .register(user)
        .register(task)
        .register(query)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_filter() {
        let clause = column_filter("minPriority", &json!(3), &WhereClause::new());
        assert_eq!(Value::Object(clause), json!({ "priority": { "gte": 3 } }));
        let clause = column_filter("projectId", &json!(1), &WhereClause::new());
        assert_eq!(Value::Object(clause), json!({ "project_id": 1 }));
    }

    #[test]
    fn test_sample_schema_builds() {
        let stores = Stores::sample();
        assert!(build_schema(&stores, &ConnectionConfig::default()).is_ok());
    }
}
